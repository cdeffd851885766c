//! Attendance taking: sheet state machine, aggregates and calendar helpers

mod calendar;
mod ledger;
mod member_stats;
mod stats;

pub use calendar::{last_sundays, previous_sunday, week_closing_sunday};
pub use ledger::{
    AttendanceLedger, Confirmation, DEFAULT_ABSENT_COMMENT, LedgerEntry, PresenceState,
};
pub use member_stats::MemberStats;
pub use stats::AttendanceStats;
