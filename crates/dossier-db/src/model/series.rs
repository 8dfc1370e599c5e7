use chrono::{DateTime, NaiveDate, Utc};
use dossier_recurrence::{ExceptionMark, ExceptionSet, ExceptionType, RecurrenceRule};
use serde::Serialize;
use uuid::Uuid;

use crate::db::enums::EntryType;

/// A recurring calendar entry: one rule anchored at `series_start_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: Uuid,
    pub master_entry_id: Uuid,
    #[serde(rename = "recurrence_rule")]
    pub rule: RecurrenceRule,
    pub series_start_date: NaiveDate,
    /// Narrower than the rule's own end after a split.
    pub series_end_date: Option<NaiveDate>,
    /// IANA zone the entry times are expressed in.
    pub timezone: String,
    /// Horizon occurrence counts are reported up to.
    pub generated_until: NaiveDate,
    /// Series this one was split off from.
    pub parent_series_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Master record of a series, or the replacement content for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub series_id: Option<Uuid>,
    pub entry_type: EntryType,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub location: Option<String>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub all_day: bool,
    /// Set on replacement records: the nominal date they override.
    pub occurrence_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesException {
    pub id: Uuid,
    pub series_id: Uuid,
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub replacement_entry_id: Option<Uuid>,
    pub reason_en: Option<String>,
    pub reason_ar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A series loaded together with everything it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesAggregate {
    pub series: Series,
    pub master: CalendarEntry,
    /// Ordered by date.
    pub exceptions: Vec<SeriesException>,
    pub replacements: Vec<CalendarEntry>,
}

impl SeriesAggregate {
    #[must_use]
    pub fn exception_set(&self) -> ExceptionSet {
        self.exceptions
            .iter()
            .map(|exception| {
                (
                    exception.exception_date,
                    ExceptionMark {
                        exception_type: exception.exception_type,
                        replacement: exception.replacement_entry_id,
                    },
                )
            })
            .collect()
    }

    #[must_use]
    pub fn exception_at(&self, date: NaiveDate) -> Option<&SeriesException> {
        self.exceptions.iter().find(|e| e.exception_date == date)
    }

    #[must_use]
    pub fn replacement(&self, id: Uuid) -> Option<&CalendarEntry> {
        self.replacements.iter().find(|entry| entry.id == id)
    }
}

/// One write in a series mutation. A list of changes is applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesChange {
    InsertSeries {
        series: Series,
        master: CalendarEntry,
    },
    /// Replace the series row. Its `version` is the one the change was planned
    /// against; the store rejects a stale one and bumps it on success.
    UpdateSeries(Series),
    /// Claim the series at `expected` without rewriting it. Guards plans that
    /// only touch exceptions or delete.
    ClaimVersion {
        id: Uuid,
        expected: i64,
    },
    UpdateEntry(CalendarEntry),
    /// Remove the series with its master entry, exceptions, and replacements.
    DeleteSeries(Uuid),
    /// Create or replace the exception for its `(series_id, exception_date)`.
    UpsertException {
        exception: SeriesException,
        replacement: Option<CalendarEntry>,
    },
    DeleteException {
        series_id: Uuid,
        date: NaiveDate,
    },
    /// Re-home an exception (and its replacement) onto another series.
    MoveException {
        from: Uuid,
        to: Uuid,
        date: NaiveDate,
    },
}
