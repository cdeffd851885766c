//! Sunday helpers; attendance is taken on Sundays

use chrono::{Datelike, Duration, NaiveDate};

/// Sunday closing the week of `today` (`today` itself when it is a Sunday)
pub fn week_closing_sunday(today: NaiveDate) -> NaiveDate {
    let days_left = (7 - i64::from(today.weekday().num_days_from_sunday())) % 7;
    today + Duration::days(days_left)
}

/// Most recent Sunday on or before `today`
pub fn previous_sunday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}

/// `count` Sundays, newest first, starting with the one closing this week
pub fn last_sundays(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let first = week_closing_sunday(today);
    (0..count)
        .map(|i| first - Duration::weeks(i as i64))
        .collect()
}
