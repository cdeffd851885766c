//! Command dispatch

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::debug;

use megadata_client::dto::{LoginRequest, RegisterRequest};
use megadata_client::{
    AttendanceRecorder, AuthService, FileSessionStorage, HealthService, MemberService,
    PresenceAdminService, ServiceContext, SessionStore, UserService,
};
use megadata_common::AppConfig;
use megadata_core::attendance::last_sundays;
use megadata_core::{Confirmation, NewMember, PresenceState, RoleBreakdown, RouteConstraint};

use crate::cli::{
    AttendanceCommand, Cli, Command, DateArg, MembersCommand, PresenceCommand, TakeArgs,
    UsersCommand,
};
use crate::output::{self, Output};

/// Build the context from configuration and run one command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let storage = FileSessionStorage::new(config.session.file.clone());
    let session = SessionStore::new(Arc::new(storage));
    session
        .restore()
        .with_context(|| format!("reading session file {}", config.session.file.display()))?;

    let ctx = ServiceContext::connect(config.api.clone(), session)?;
    debug!(base_url = %config.api.base_url, "Client ready");

    let out = Output::new(cli.json);
    match cli.command {
        Command::Login { login, password } => login_cmd(&ctx, out, login, password).await,
        Command::Register(args) => {
            let request = RegisterRequest {
                username: args.username,
                password: args.password,
                nom: args.last_name,
                prenom: args.first_name,
                branche: args.branch,
            };
            let response = AuthService::new(&ctx).register(request).await?;
            out.emit(&response, |r| {
                println!("Registered and signed in as {}", output::session_line(&r.session));
            })
        }
        Command::Logout => {
            let was_signed_in = AuthService::new(&ctx).logout()?;
            out.emit(&was_signed_in, |&signed_in| {
                if signed_in {
                    println!("Signed out");
                } else {
                    println!("Not signed in");
                }
            })
        }
        Command::Whoami { refresh } => {
            let session = if refresh {
                AuthService::new(&ctx).sync_profile().await?
            } else {
                ctx.require(RouteConstraint::None)?
            };
            out.emit(&session, |s| {
                println!("{}", output::session_line(s));
                if let Some(expires) = s.expires_at_utc() {
                    println!("Session expires {expires}");
                }
            })
        }
        Command::Guard { path } => {
            let (screen, decision) = AuthService::new(&ctx).guard_path(&path)?;
            let value = serde_json::json!({ "screen": screen, "decision": decision });
            out.emit(&value, |_| println!("{}: {}", screen.path(), output::decision_line(&decision)))
        }
        Command::Health => {
            let status = HealthService::new(&ctx).check().await;
            out.emit(&status, |s| {
                if s.online {
                    println!("{} is online", s.base_url);
                } else {
                    println!("{} is offline", s.base_url);
                }
            })?;
            if !status.online {
                bail!("backend unreachable");
            }
            Ok(())
        }
        Command::Members(command) => members_cmd(&ctx, out, command).await,
        Command::Users(command) => users_cmd(&ctx, out, command).await,
        Command::Attendance(command) => attendance_cmd(ctx, out, command).await,
        Command::Presence(command) => presence_cmd(&ctx, out, command).await,
        Command::Sundays { count } => {
            let sundays = last_sundays(today(), count);
            out.emit(&sundays, |days| days.iter().for_each(|d| println!("{d}")))
        }
    }
}

async fn login_cmd(
    ctx: &ServiceContext,
    out: Output,
    login: String,
    password: String,
) -> anyhow::Result<()> {
    let response = AuthService::new(ctx)
        .login(LoginRequest { login, password })
        .await?;
    out.emit(&response, |r| {
        println!("Signed in as {}", output::session_line(&r.session));
        println!("Home screen: {}", r.home.path());
    })
}

async fn members_cmd(ctx: &ServiceContext, out: Output, command: MembersCommand) -> anyhow::Result<()> {
    let service = MemberService::new(ctx);
    match command {
        MembersCommand::List => {
            let members = service.visible_members().await?;
            out.emit(&members, |members| members.iter().for_each(|m| println!("{}", output::member_line(m))))
        }
        MembersCommand::Search { query, service: filter } => {
            let members = service.search(query.as_deref(), filter.as_deref()).await?;
            out.emit(&members, |members| {
                members.iter().for_each(|m| println!("{}", output::member_line(m)));
                println!("{} found", members.len());
            })
        }
        MembersCommand::Add(args) => {
            let form = NewMember {
                last_name: args.last_name,
                first_name: args.first_name,
                phone: args.phone,
                neighborhood: args.neighborhood,
                service: args.service,
            };
            let created = service.register(form).await?;
            out.emit(&created, |created| match created {
                Some(member) => println!("Registered {}", output::member_line(member)),
                None => println!("Registered"),
            })
        }
        MembersCommand::Delete { id } => {
            service.delete(id).await?;
            out.emit(&id, |id| println!("Deleted member {id}"))
        }
        MembersCommand::Stats => {
            let stats = service.stats().await?;
            out.emit(&stats, |s| {
                println!("Total: {}", s.total);
                println!("Registered today: {}", s.registered_today);
                println!("Registered this week: {}", s.registered_this_week);
                for (neighborhood, count) in &s.by_neighborhood {
                    println!("  {neighborhood}: {count}");
                }
            })
        }
    }
}

async fn users_cmd(ctx: &ServiceContext, out: Output, command: UsersCommand) -> anyhow::Result<()> {
    let service = UserService::new(ctx);
    match command {
        UsersCommand::List => {
            let accounts = service.list().await?;
            let breakdown = RoleBreakdown::from_accounts(&accounts);
            let value = serde_json::json!({ "users": accounts, "breakdown": breakdown });
            out.emit(&value, |_| {
                accounts.iter().for_each(|a| println!("{}", output::account_line(a)));
                println!(
                    "{} accounts: {} members, {} bergers, {} admins",
                    breakdown.total, breakdown.members, breakdown.bergers, breakdown.admins
                );
            })
        }
        UsersCommand::SetRole { id, role } => {
            service.set_role(id, role).await?;
            out.emit(&role, |role| println!("User {id} is now {role}"))
        }
        UsersCommand::Delete { id } => {
            service.delete(id).await?;
            out.emit(&id, |id| println!("Deleted user {id}"))
        }
    }
}

async fn attendance_cmd(
    ctx: ServiceContext,
    out: Output,
    command: AttendanceCommand,
) -> anyhow::Result<()> {
    let recorder = AttendanceRecorder::new(ctx);
    match command {
        AttendanceCommand::Show(date) => {
            recorder.load(date_or_today(&date)).await?;
            print_loaded_sheet(&recorder, out)
        }
        AttendanceCommand::Take(args) => take(&recorder, out, args).await,
        AttendanceCommand::MarkAllPresent { date, yes } => {
            recorder.load(date_or_today(&date)).await?;
            let confirmation = confirm(yes, "Mark every member present?")?;
            let message = recorder.mark_all_present(confirmation).await?;
            out.emit(&message, |m| println!("{m}"))
        }
        AttendanceCommand::History(date) => {
            let history = recorder.history(date_or_today(&date)).await?;
            out.emit(&history, |days| {
                for day in days {
                    println!(
                        "{}  {}/{} present ({}%)",
                        day.date, day.stats.present, day.stats.total, day.stats.rate
                    );
                }
            })
        }
        AttendanceCommand::Report(date) => {
            let report = recorder.report(date_or_today(&date)).await?;
            // The report has no fixed shape; always print it as JSON
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn take(recorder: &AttendanceRecorder, out: Output, args: TakeArgs) -> anyhow::Result<()> {
    recorder.load(date_or_today(&args.date)).await?;

    if args.all_absent {
        recorder.mark_all_absent(confirm(args.yes, "Mark every member absent?")?)?;
    }

    let sheet = recorder.sheet().context("no attendance sheet loaded")?;
    let wanted = args
        .absent
        .iter()
        .map(|id| (*id, PresenceState::Absent))
        .chain(args.present.iter().map(|id| (*id, PresenceState::Present)));
    for (id, state) in wanted {
        let current = sheet
            .entry(id)
            .map(|e| e.state)
            .with_context(|| format!("member {id} is not on this roster"))?;
        if current != state {
            recorder.toggle(id)?;
        }
    }
    for (id, text) in args.comments {
        recorder.set_comment(id, text)?;
    }

    let saved = recorder.save().await?;
    debug!(records = saved, "Sheet saved");
    print_loaded_sheet(recorder, out)
}

async fn presence_cmd(ctx: &ServiceContext, out: Output, command: PresenceCommand) -> anyhow::Result<()> {
    let service = PresenceAdminService::new(ctx);
    match command {
        PresenceCommand::Overview { date, service: filter } => {
            let overview = service.overview(date_or_today(&date), filter.as_deref()).await?;
            out.emit(&overview, |o| {
                for row in &o.rows {
                    let mark = if row.present { "present" } else { "absent " };
                    println!(
                        "{mark}  {:<30}  {:<16}  {}",
                        row.full_name(),
                        row.service,
                        row.comment.as_deref().unwrap_or("")
                    );
                }
                for totals in o.by_service() {
                    println!(
                        "{}: {}/{} ({}%)",
                        totals.service, totals.stats.present, totals.stats.total, totals.stats.rate
                    );
                }
                println!("Overall: {}/{} ({}%)", o.stats.present, o.stats.total, o.stats.rate);
            })
        }
        PresenceCommand::History { id } => {
            let history = service.member_history(id).await?;
            out.emit(&history, |entries| {
                for entry in entries {
                    let mark = if entry.present { "present" } else { "absent " };
                    println!("{}  {mark}  {}", entry.date, entry.comment.as_deref().unwrap_or(""));
                }
            })
        }
        PresenceCommand::ByService { start, end } => {
            let stats = service.stats_by_service(start, end).await?;
            out.emit(&stats, |services| {
                for s in services {
                    println!("{}: {}/{} ({}%)", s.service, s.stats.present, s.stats.total, s.stats.rate);
                }
            })
        }
    }
}

fn print_loaded_sheet(recorder: &AttendanceRecorder, out: Output) -> anyhow::Result<()> {
    let sheet = recorder.sheet().context("no attendance sheet loaded")?;
    out.emit(&sheet, output::print_sheet)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_or_today(arg: &DateArg) -> NaiveDate {
    arg.date.unwrap_or_else(today)
}

/// Ask on stdin unless `--yes` was given
fn confirm(yes: bool, prompt: &str) -> anyhow::Result<Confirmation> {
    if yes {
        return Ok(Confirmation::Confirmed);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(Confirmation::from_bool(parse_answer(&answer)))
}

fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "o" | "oui")
}
