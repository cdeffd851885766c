//! Command-line arguments

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use megadata_core::{MemberId, Role, UserId};

#[derive(Debug, Parser)]
#[command(name = "megadata", version, about = "MEGA-DATA church membership and attendance client")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides MEGADATA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides MEGADATA_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Username or phone number
        login: String,
        #[arg(long, env = "MEGADATA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami {
        /// Refresh the assigned service from the backend profile
        #[arg(long)]
        refresh: bool,
    },
    /// Decide whether the session may open a screen path
    Guard { path: String },
    /// Check that the backend answers
    Health,
    /// Church members
    #[command(subcommand)]
    Members(MembersCommand),
    /// Login accounts (admin)
    #[command(subcommand)]
    Users(UsersCommand),
    /// Take attendance for the assigned service (berger)
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// Attendance across services (admin)
    #[command(subcommand)]
    Presence(PresenceCommand),
    /// List the most recent Sundays
    Sundays {
        #[arg(long, default_value_t = 4)]
        count: usize,
    },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long, env = "MEGADATA_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub branch: String,
}

#[derive(Debug, Subcommand)]
pub enum MembersCommand {
    /// Members visible to the session
    List,
    Search {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        service: Option<String>,
    },
    /// Register a member
    Add(NewMemberArgs),
    Delete { id: MemberId },
    /// Totals, recent registrations and neighborhoods
    Stats,
}

#[derive(Debug, Args)]
pub struct NewMemberArgs {
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub neighborhood: String,
    /// Defaults to the berger's assigned service
    #[arg(long, default_value = "")]
    pub service: String,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    List,
    SetRole { id: UserId, role: Role },
    Delete { id: UserId },
}

#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Show the sheet for a date
    Show(DateArg),
    /// Edit the sheet and save it
    Take(TakeArgs),
    /// Mark every member present on the backend
    MarkAllPresent {
        #[command(flatten)]
        date: DateArg,
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Daily totals over the 30 days before a date
    History(DateArg),
    /// Backend report for a date
    Report(DateArg),
}

#[derive(Debug, Args)]
pub struct DateArg {
    /// Attendance date (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct TakeArgs {
    #[command(flatten)]
    pub date: DateArg,
    /// Start from everyone absent
    #[arg(long)]
    pub all_absent: bool,
    /// Members to mark absent
    #[arg(long = "absent", value_name = "ID")]
    pub absent: Vec<MemberId>,
    /// Members to mark present
    #[arg(long = "present", value_name = "ID")]
    pub present: Vec<MemberId>,
    /// Comment for an absent member, as ID=TEXT
    #[arg(long = "comment", value_name = "ID=TEXT", value_parser = parse_comment)]
    pub comments: Vec<(MemberId, String)>,
    /// Skip the confirmation for --all-absent
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum PresenceCommand {
    /// Every presence recorded on a date
    Overview {
        #[command(flatten)]
        date: DateArg,
        /// Service name, or "tous" for all
        #[arg(long)]
        service: Option<String>,
    },
    /// A member's presence history
    History { id: MemberId },
    /// Per-service totals over a period
    ByService {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

fn parse_comment(raw: &str) -> Result<(MemberId, String), String> {
    let (id, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got `{raw}`"))?;
    let id = MemberId::parse(id).map_err(|e| e.to_string())?;
    Ok((id, text.to_string()))
}
