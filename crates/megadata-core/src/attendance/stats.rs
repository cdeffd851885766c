//! Attendance aggregates

use serde::{Deserialize, Serialize};

use crate::entities::AttendanceRecord;

/// Derived counts for one sheet; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    /// Whole percentage, rounded half up; 0 for an empty sheet
    pub rate: u32,
}

impl AttendanceStats {
    pub fn from_counts(total: usize, present: usize) -> Self {
        let present = present.min(total);
        Self {
            total,
            present,
            absent: total - present,
            rate: rate(present, total),
        }
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        let (total, present) = records
            .into_iter()
            .fold((0, 0), |(t, p), r| (t + 1, p + usize::from(r.present)));
        Self::from_counts(total, present)
    }
}

fn rate(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (present, total) = (present as u64, total as u64);
    ((present * 200 + total) / (2 * total)) as u32
}
