//! Request and response bodies of the recurring-events use cases.

use chrono::{DateTime, NaiveDate, Utc};
use dossier_db::db::enums::EntryType;
use dossier_db::model::series::{CalendarEntry, Series, SeriesException};
use dossier_recurrence::{EditScope, ExceptionType, OccurrenceStatus, RuleFields, RulePatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeriesRequest {
    pub entry_type: EntryType,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ar: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_datetime: DateTime<Utc>,
    #[serde(default)]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    /// IANA zone name; UTC when absent.
    #[serde(default)]
    pub timezone: Option<String>,
    pub recurrence: RuleFields,
    #[serde(default)]
    pub generate_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSeriesResponse {
    pub series: Series,
    pub master_event: CalendarEntry,
    pub generated_occurrences: usize,
    pub next_occurrences: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrenceQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub include_cancelled: Option<bool>,
}

/// One occurrence with its concrete times and the content that applies on that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceView {
    pub occurrence_date: NaiveDate,
    pub status: OccurrenceStatus,
    pub exception_type: Option<ExceptionType>,
    pub replacement_event_id: Option<Uuid>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrencesResponse {
    pub series: Series,
    pub recurrence_rule: RuleFields,
    pub exceptions: Vec<SeriesException>,
    pub occurrences: Vec<OccurrenceView>,
    /// Occurrences in the window before `limit` is applied.
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EditOptions {
    pub scope: EditScope,
    #[serde(default)]
    pub occurrence_date: Option<NaiveDate>,
}

/// Record fields an edit may change. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntryUpdates {
    pub entry_type: Option<EntryType>,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub location: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSeriesRequest {
    pub edit_options: EditOptions,
    #[serde(default)]
    pub updates: EntryUpdates,
    #[serde(default)]
    pub recurrence_updates: Option<RulePatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSeriesResponse {
    pub series_id: Uuid,
    pub updated_count: usize,
    /// Set when a "this and future" edit split the series.
    pub new_series_id: Option<Uuid>,
    pub dropped_exceptions: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteSeriesRequest {
    pub edit_options: EditOptions,
    #[serde(default)]
    pub reason_en: Option<String>,
    #[serde(default)]
    pub reason_ar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSeriesResponse {
    pub series_id: Uuid,
    pub deleted_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddExceptionRequest {
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    #[serde(default)]
    pub reason_en: Option<String>,
    #[serde(default)]
    pub reason_ar: Option<String>,
    #[serde(default)]
    pub replacement_event: Option<EntryUpdates>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RRuleResponse {
    pub series_id: Uuid,
    pub rrule: String,
}
