//! Human or JSON rendering of command results

use serde::Serialize;

use megadata_core::{AttendanceLedger, GuardDecision, Member, PresenceState, Session, UserAccount};

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or through `human` otherwise
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

pub fn session_line(session: &Session) -> String {
    match session.assigned_service() {
        Some(service) => format!("{} ({}, {service})", session.username, session.role),
        None => format!("{} ({})", session.username, session.role),
    }
}

pub fn member_line(member: &Member) -> String {
    format!(
        "{:>5}  {:<30}  {:<16}  {:<16}  {}",
        member.id.into_inner(),
        member.full_name(),
        member.phone,
        member.neighborhood_label(),
        member.service
    )
}

pub fn account_line(account: &UserAccount) -> String {
    format!(
        "{:>5}  {:<20}  {:<12}  {}",
        account.id.into_inner(),
        account.username,
        account.role.as_str(),
        account.assigned_service.as_deref().unwrap_or("-")
    )
}

pub fn decision_line(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Render => "render".to_string(),
        GuardDecision::Redirect { to, reason } => format!("redirect to {} ({reason})", to.path()),
    }
}

pub fn print_sheet(sheet: &AttendanceLedger) {
    println!("{} - {}", sheet.service(), sheet.date());
    for entry in sheet.entries() {
        let mark = match entry.state {
            PresenceState::Present => "present",
            PresenceState::Absent => "absent ",
        };
        match &entry.comment {
            Some(comment) => println!(
                "{:>5}  {mark}  {:<30}  {comment}",
                entry.member.id.into_inner(),
                entry.member.full_name()
            ),
            None => println!(
                "{:>5}  {mark}  {}",
                entry.member.id.into_inner(),
                entry.member.full_name()
            ),
        }
    }
    let stats = sheet.stats();
    println!(
        "{} members, {} present, {} absent, {}%",
        stats.total, stats.present, stats.absent, stats.rate
    );
}
