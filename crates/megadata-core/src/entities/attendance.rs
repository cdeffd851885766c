//! Attendance record entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, UserId};

/// One member's presence on one calendar day
///
/// Unique per `(member_id, date)`; the backend enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub member_id: MemberId,
    pub date: NaiveDate,
    pub present: bool,
    pub comment: Option<String>,
    pub recorded_by: Option<UserId>,
}

impl AttendanceRecord {
    pub fn new(member_id: MemberId, date: NaiveDate, present: bool) -> Self {
        Self {
            member_id,
            date,
            present,
            comment: None,
            recorded_by: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn recorded_by(mut self, user_id: UserId) -> Self {
        self.recorded_by = Some(user_id);
        self
    }

    /// Uniqueness key
    pub fn key(&self) -> (MemberId, NaiveDate) {
        (self.member_id, self.date)
    }
}
