//! Calendar-month arithmetic over `chrono::NaiveDate`.
//!
//! Reports work in whole calendar days and calendar months; there is no time
//! of day or timezone involved anywhere below the query layer.

use chrono::{Datelike, Days, Month, Months, NaiveDate};

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.day0())))
        .unwrap_or(date)
}

/// First day of the month after the one containing `date`.
///
/// `None` only at the far end of chrono's supported range.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(1))
}

/// Last calendar day of the month containing `date` (handles 28/29/30/31).
pub fn month_end(date: NaiveDate) -> NaiveDate {
    next_month(date)
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// English month name for a 1-based month number, or `""` when out of range.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

/// Iterator over month starts from `month_start(from)` through
/// `month_start(to)`, inclusive. Empty when `from` is in a later month than `to`.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl MonthRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            next: Some(month_start(from)),
            last: month_start(to),
        }
    }
}

impl Iterator for MonthRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|m| *m <= self.last)?;
        self.next = next_month(current);
        Some(current)
    }
}
