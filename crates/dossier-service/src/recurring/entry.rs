//! Calendar-entry arithmetic: time zones, per-date times, and field updates.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use dossier_db::model::series::CalendarEntry;
use uuid::Uuid;

use super::types::EntryUpdates;
use crate::error::{ServiceResult, validation};

/// ## Errors
/// Returns a validation error for names that are not IANA zones.
pub fn parse_timezone(name: &str) -> ServiceResult<Tz> {
    name.parse::<Tz>().map_err(|_err| {
        validation(
            "timezone must be an IANA time zone name",
            "يجب أن تكون المنطقة الزمنية اسماً صالحاً من قاعدة IANA",
        )
    })
}

/// Local calendar date of `instant` in `tz`.
#[must_use]
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Resolve a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move forward an hour.
fn to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let resolve = |naive: NaiveDateTime| match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    };
    resolve(local)
        .or_else(|| local.checked_add_signed(TimeDelta::hours(1)).and_then(resolve))
        .unwrap_or_else(|| {
            tracing::warn!(%tz, %local, "Local time cannot be resolved, treating it as UTC");
            Utc.from_utc_datetime(&local)
        })
}

/// Local time of day of `instant` in `tz`.
#[must_use]
pub fn local_time(instant: DateTime<Utc>, tz: Tz) -> NaiveTime {
    instant.with_timezone(&tz).time()
}

/// `instant`'s local time of day in `tz`, placed on `date`.
fn same_time_on(instant: DateTime<Utc>, tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    to_utc(tz, date.and_time(local_time(instant, tz)))
}

/// Start and end of the occurrence on `date`, keeping the master's local
/// time of day and duration.
#[must_use]
pub fn occurrence_times(master: &CalendarEntry, tz: Tz, date: NaiveDate) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    let start = same_time_on(master.start_datetime, tz, date);
    let end = master
        .end_datetime
        .map(|end| start + (end - master.start_datetime));
    (start, end)
}

fn ensure_ordered(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ServiceResult<()> {
    match end {
        Some(end) if end < start => Err(validation(
            "end_datetime must not be before start_datetime",
            "يجب ألا يسبق وقت الانتهاء وقت البدء",
        )),
        _ => Ok(()),
    }
}

/// ## Errors
/// Returns a validation error if neither title is present or the end
/// precedes the start.
pub fn validate_entry(
    title_en: Option<&str>,
    title_ar: Option<&str>,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> ServiceResult<()> {
    let has_title = [title_en, title_ar]
        .into_iter()
        .flatten()
        .any(|title| !title.trim().is_empty());
    if !has_title {
        return Err(validation(
            "At least one of title_en or title_ar is required",
            "يجب إدخال العنوان بالإنجليزية أو بالعربية على الأقل",
        ));
    }
    ensure_ordered(start, end)
}

fn apply_text(entry: &mut CalendarEntry, updates: &EntryUpdates) {
    if let Some(entry_type) = updates.entry_type {
        entry.entry_type = entry_type;
    }
    let text_fields = [
        (&mut entry.title_en, &updates.title_en),
        (&mut entry.title_ar, &updates.title_ar),
        (&mut entry.description_en, &updates.description_en),
        (&mut entry.description_ar, &updates.description_ar),
        (&mut entry.location, &updates.location),
    ];
    for (field, update) in text_fields {
        if let Some(value) = update {
            *field = Some(value.clone());
        }
    }
    if let Some(all_day) = updates.all_day {
        entry.all_day = all_day;
    }
}

/// ## Summary
/// Apply a series-wide update to a master entry anchored at `anchor`.
///
/// Only the time of day of `start_datetime` is taken; the master always
/// starts on the series anchor. The duration comes from the updated start
/// and end, or stays as it was.
///
/// ## Errors
/// Returns a validation error if the resulting end precedes the start.
pub fn rebase_master(
    master: &CalendarEntry,
    updates: &EntryUpdates,
    tz: Tz,
    anchor: NaiveDate,
    now: DateTime<Utc>,
) -> ServiceResult<CalendarEntry> {
    let mut entry = master.clone();
    apply_text(&mut entry, updates);

    let requested_start = updates.start_datetime.unwrap_or(master.start_datetime);
    let duration = match updates.end_datetime {
        Some(end) => Some(end - requested_start),
        None => master.end_datetime.map(|end| end - master.start_datetime),
    };
    if duration.is_some_and(|d| d < TimeDelta::zero()) {
        return Err(validation(
            "end_datetime must not be before start_datetime",
            "يجب ألا يسبق وقت الانتهاء وقت البدء",
        ));
    }

    entry.start_datetime = same_time_on(requested_start, tz, anchor);
    entry.end_datetime = duration.map(|d| entry.start_datetime + d);
    entry.updated_at = now;
    Ok(entry)
}

/// ## Summary
/// Content for one overridden date. Builds on `existing` when the date was
/// already overridden, otherwise on the master's occurrence at `date`.
/// Time updates are taken literally.
///
/// ## Errors
/// Returns a validation error if the resulting end precedes the start.
pub fn replacement_entry(
    master: &CalendarEntry,
    existing: Option<&CalendarEntry>,
    updates: &EntryUpdates,
    tz: Tz,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> ServiceResult<CalendarEntry> {
    let mut entry = if let Some(existing) = existing {
        existing.clone()
    } else {
        let (start, end) = occurrence_times(master, tz, date);
        CalendarEntry {
            id: Uuid::now_v7(),
            series_id: master.series_id,
            occurrence_date: Some(date),
            start_datetime: start,
            end_datetime: end,
            created_at: now,
            ..master.clone()
        }
    };
    apply_text(&mut entry, updates);

    let start = updates.start_datetime.unwrap_or(entry.start_datetime);
    let end = match (updates.end_datetime, updates.start_datetime) {
        (Some(end), _) => Some(end),
        (None, Some(_)) => entry.end_datetime.map(|end| start + (end - entry.start_datetime)),
        (None, None) => entry.end_datetime,
    };
    ensure_ordered(start, end)?;

    entry.start_datetime = start;
    entry.end_datetime = end;
    entry.updated_at = now;
    Ok(entry)
}
