//! Attendance sheet state machine
//!
//! One sheet covers a berger's roster for a single calendar day. Every
//! member holds exactly one [`PresenceState`]; statistics are recomputed
//! after each change so readers never see stale counts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::stats::AttendanceStats;
use crate::entities::{AttendanceRecord, Member};
use crate::error::DomainError;
use crate::value_objects::{MemberId, UserId};

/// Comment attached when a member is marked absent
pub const DEFAULT_ABSENT_COMMENT: &str = "Absent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    #[default]
    Present,
    Absent,
}

impl PresenceState {
    pub fn from_present(present: bool) -> Self {
        if present {
            Self::Present
        } else {
            Self::Absent
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    pub fn flipped(&self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }
}

/// Answer to a bulk-operation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_bool(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }

    pub fn ensure(self) -> Result<(), DomainError> {
        match self {
            Self::Confirmed => Ok(()),
            Self::Declined => Err(DomainError::NotConfirmed),
        }
    }
}

/// One roster line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub member: Member,
    pub state: PresenceState,
    pub comment: Option<String>,
}

impl LedgerEntry {
    fn mark(&mut self, state: PresenceState) {
        self.state = state;
        self.comment = match state {
            PresenceState::Present => None,
            PresenceState::Absent => Some(DEFAULT_ABSENT_COMMENT.to_string()),
        };
    }
}

/// Attendance sheet for one service and date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceLedger {
    service: String,
    date: NaiveDate,
    entries: Vec<LedgerEntry>,
    stats: AttendanceStats,
}

impl AttendanceLedger {
    /// Build a sheet from the roster and whatever records already exist
    ///
    /// Members without a record start out present. Records for members not
    /// on the roster are ignored.
    pub fn load(
        service: impl Into<String>,
        date: NaiveDate,
        roster: Vec<Member>,
        records: &[AttendanceRecord],
    ) -> Self {
        let existing: HashMap<MemberId, &AttendanceRecord> = records
            .iter()
            .filter(|r| r.date == date)
            .map(|r| (r.member_id, r))
            .collect();

        let entries = roster
            .into_iter()
            .map(|member| match existing.get(&member.id) {
                Some(record) => LedgerEntry {
                    state: PresenceState::from_present(record.present),
                    comment: record.comment.clone().filter(|c| !c.is_empty()),
                    member,
                },
                None => LedgerEntry {
                    member,
                    state: PresenceState::Present,
                    comment: None,
                },
            })
            .collect();

        let mut ledger = Self {
            service: service.into(),
            date,
            entries,
            stats: AttendanceStats::default(),
        };
        ledger.recompute();
        ledger
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entry(&self, member_id: MemberId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.member.id == member_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> AttendanceStats {
        self.stats
    }

    /// Flip a member between present and absent
    pub fn toggle(&mut self, member_id: MemberId) -> Result<PresenceState, DomainError> {
        let entry = self.entry_mut(member_id)?;
        let next = entry.state.flipped();
        entry.mark(next);
        self.recompute();
        Ok(next)
    }

    /// Replace the comment of an absent member
    pub fn set_comment(
        &mut self,
        member_id: MemberId,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let entry = self.entry_mut(member_id)?;
        if entry.state.is_present() {
            return Err(DomainError::CommentWhilePresent(member_id));
        }
        let text = text.into();
        entry.comment = if text.trim().is_empty() { None } else { Some(text) };
        Ok(())
    }

    /// Everyone present, comments cleared
    pub fn set_all_present(&mut self, confirmation: Confirmation) -> Result<(), DomainError> {
        confirmation.ensure()?;
        self.mark_all(PresenceState::Present);
        Ok(())
    }

    /// Everyone absent with the default comment
    pub fn set_all_absent(&mut self, confirmation: Confirmation) -> Result<(), DomainError> {
        confirmation.ensure()?;
        self.mark_all(PresenceState::Absent);
        Ok(())
    }

    /// One record per roster member, as sent to the backend on save
    pub fn records(&self, recorded_by: Option<UserId>) -> Vec<AttendanceRecord> {
        self.entries
            .iter()
            .map(|e| AttendanceRecord {
                member_id: e.member.id,
                date: self.date,
                present: e.state.is_present(),
                comment: e.comment.clone(),
                recorded_by,
            })
            .collect()
    }

    fn mark_all(&mut self, state: PresenceState) {
        for entry in &mut self.entries {
            entry.mark(state);
        }
        self.recompute();
    }

    fn entry_mut(&mut self, member_id: MemberId) -> Result<&mut LedgerEntry, DomainError> {
        self.entries
            .iter_mut()
            .find(|e| e.member.id == member_id)
            .ok_or(DomainError::MemberNotFound(member_id))
    }

    fn recompute(&mut self) {
        let present = self.entries.iter().filter(|e| e.state.is_present()).count();
        self.stats = AttendanceStats::from_counts(self.entries.len(), present);
    }
}
