//! Member list statistics shown on the dashboards

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::Member;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberStats {
    pub total: usize,
    pub registered_today: usize,
    /// Registered within the last seven days
    pub registered_this_week: usize,
    pub by_neighborhood: BTreeMap<String, usize>,
}

impl MemberStats {
    pub fn compute(members: &[Member], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let week_ago = now - Duration::days(7);

        let mut stats = Self {
            total: members.len(),
            ..Self::default()
        };
        for member in members {
            if member.created_at.date_naive() == today {
                stats.registered_today += 1;
            }
            if member.created_at >= week_ago {
                stats.registered_this_week += 1;
            }
            *stats
                .by_neighborhood
                .entry(member.neighborhood_label().to_string())
                .or_default() += 1;
        }
        stats
    }
}
