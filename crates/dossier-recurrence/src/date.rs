//! Calendar arithmetic used by the generator.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::rule::WeekOfMonth;

/// Sunday of the week containing `date`. Weeks start on Sunday, matching the
/// 0 = Sunday weekday numbering of rules.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}

/// Number of days in the given month, or `None` for an out-of-range year/month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Splits a month counter (`year * 12 + month0`) back into `(year, month)`.
#[must_use]
pub fn month_from_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// Month counter for `date`, the inverse of [`month_from_index`].
#[must_use]
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// The date matching an ordinal weekday ("third Tuesday", "last Friday") in a
/// month. `Last` scans backward from the month's final day.
#[must_use]
pub fn ordinal_weekday(year: i32, month: u32, week: WeekOfMonth, weekday: Weekday) -> Option<NaiveDate> {
    if let Some(n) = week.ordinal() {
        return NaiveDate::from_weekday_of_month_opt(year, month, weekday, n);
    }

    let last_day = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
    let back = (7 + last_day.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
    last_day.checked_sub_days(Days::new(u64::from(back)))
}

/// Weekday for a 0 = Sunday index.
#[must_use]
pub fn weekday_from_sunday_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
