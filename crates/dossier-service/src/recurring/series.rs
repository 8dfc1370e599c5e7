//! Creating, reading, and exporting series.

use chrono::{DateTime, Days, NaiveDate, Utc};
use dossier_core::bilingual;
use dossier_core::config::RecurrenceConfig;
use dossier_db::db::SeriesRepository;
use dossier_db::model::series::{CalendarEntry, Series, SeriesAggregate, SeriesChange};
use dossier_recurrence::{
    Occurrence, OccurrenceGenerator, RecurrenceRule, SeriesStart, apply_exceptions, to_rrule_text,
};
use uuid::Uuid;

use super::entry::{local_date, local_time, occurrence_times, parse_timezone, validate_entry};
use super::load_series;
use super::types::{
    CreateSeriesRequest, CreateSeriesResponse, OccurrenceQuery, OccurrenceView,
    OccurrencesResponse, RRuleResponse,
};
use crate::error::{ServiceError, ServiceResult, validation};

const DEFAULT_PAGE_SIZE: usize = 100;

fn horizon_from(date: NaiveDate, config: &RecurrenceConfig) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(config.default_horizon_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Reject windows wider than `max_window_days`.
fn ensure_window(start: NaiveDate, end: NaiveDate, config: &RecurrenceConfig) -> ServiceResult<()> {
    if end.signed_duration_since(start).num_days() > i64::from(config.max_window_days) {
        return Err(ServiceError::ValidationError(bilingual!(
            "Date window must not exceed {} days",
            "يجب ألا تتجاوز الفترة الزمنية {} يوماً",
            config.max_window_days
        )));
    }
    Ok(())
}

/// ## Summary
/// Create a series with its master entry.
///
/// The rule is anchored at the local date of `start_datetime` in the series
/// time zone. Occurrences are counted up to `generate_until`, or the default
/// horizon past the anchor.
///
/// ## Side Effects
/// Inserts the series and its master entry.
///
/// ## Errors
/// Returns a validation error for missing titles, reversed times, an unknown
/// time zone, a rule that does not validate, or a `generate_until` before the
/// start or beyond the maximum window.
#[tracing::instrument(skip(repo, config, request), fields(entry_type = %request.entry_type))]
pub async fn create_series(
    repo: &dyn SeriesRepository,
    config: &RecurrenceConfig,
    request: CreateSeriesRequest,
    now: DateTime<Utc>,
) -> ServiceResult<CreateSeriesResponse> {
    validate_entry(
        request.title_en.as_deref(),
        request.title_ar.as_deref(),
        request.start_datetime,
        request.end_datetime,
    )?;

    let timezone = request.timezone.unwrap_or_else(|| "UTC".to_string());
    let tz = parse_timezone(&timezone)?;
    let anchor = local_date(request.start_datetime, tz);

    let rule = RecurrenceRule::try_from(request.recurrence.with_anchor_defaults(anchor))?;
    rule.validate_anchor(anchor)?;

    let generate_until = request
        .generate_until
        .unwrap_or_else(|| horizon_from(anchor, config));
    if generate_until < anchor {
        return Err(validation(
            "generate_until must not be before the start date",
            "يجب ألا يسبق تاريخ التوليد تاريخ البدء",
        ));
    }
    ensure_window(anchor, generate_until, config)?;

    let series_id = Uuid::now_v7();
    let master = CalendarEntry {
        id: Uuid::now_v7(),
        series_id: Some(series_id),
        entry_type: request.entry_type,
        title_en: request.title_en,
        title_ar: request.title_ar,
        description_en: request.description_en,
        description_ar: request.description_ar,
        location: request.location,
        start_datetime: request.start_datetime,
        end_datetime: request.end_datetime,
        all_day: request.all_day,
        occurrence_date: None,
        created_at: now,
        updated_at: now,
    };
    let series = Series {
        id: series_id,
        master_entry_id: master.id,
        rule,
        series_start_date: anchor,
        series_end_date: None,
        timezone,
        generated_until: generate_until,
        parent_series_id: None,
        version: 1,
        created_at: now,
        updated_at: now,
    };

    let generator = OccurrenceGenerator::new(&series.rule, anchor);
    let generated_occurrences = generator.count_between(anchor, generate_until);
    let today = local_date(now, tz);
    let next_occurrences = generator.generate(today.max(anchor), generate_until, config.next_occurrences_preview);

    repo.apply_changes(vec![SeriesChange::InsertSeries {
        series: series.clone(),
        master: master.clone(),
    }])
    .await?;

    tracing::info!(
        series_id = %series.id,
        %anchor,
        generated_occurrences,
        "Created recurring series"
    );

    Ok(CreateSeriesResponse {
        series,
        master_event: master,
        generated_occurrences,
        next_occurrences,
    })
}

fn occurrence_view(aggregate: &SeriesAggregate, tz: chrono_tz::Tz, occurrence: &Occurrence) -> OccurrenceView {
    let replacement = occurrence
        .replacement
        .and_then(|id| aggregate.replacement(id));
    let (source, (start, end)) = match replacement {
        Some(entry) => (entry, (entry.start_datetime, entry.end_datetime)),
        None => (
            &aggregate.master,
            occurrence_times(&aggregate.master, tz, occurrence.date),
        ),
    };
    OccurrenceView {
        occurrence_date: occurrence.date,
        status: occurrence.status,
        exception_type: occurrence.exception_type,
        replacement_event_id: occurrence.replacement,
        start_datetime: start,
        end_datetime: end,
        all_day: source.all_day,
        title_en: source.title_en.clone(),
        title_ar: source.title_ar.clone(),
        location: source.location.clone(),
    }
}

/// ## Summary
/// Occurrences of a series in a date window with exceptions applied.
///
/// The window defaults to the series start through the default horizon
/// after the window start. Cancelled dates are included unless
/// `include_cancelled` is false. Every date in the window is counted but
/// only the first `limit` are rendered.
///
/// ## Errors
/// Returns `NotFound` for an unknown series and a validation error if the
/// window is reversed or wider than the maximum window.
#[tracing::instrument(skip(repo, config, query))]
pub async fn list_occurrences(
    repo: &dyn SeriesRepository,
    config: &RecurrenceConfig,
    series_id: Uuid,
    query: &OccurrenceQuery,
) -> ServiceResult<OccurrencesResponse> {
    let aggregate = load_series(repo, series_id).await?;
    let series = &aggregate.series;
    let tz = parse_timezone(&series.timezone)?;

    let range_start = query.start_date.unwrap_or(series.series_start_date);
    let range_end = query
        .end_date
        .unwrap_or_else(|| horizon_from(range_start, config));
    if range_end < range_start {
        return Err(validation(
            "end_date must not be before start_date",
            "يجب ألا يسبق تاريخ النهاية تاريخ البداية",
        ));
    }
    ensure_window(range_start, range_end, config)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(config.max_page_size);
    let include_cancelled = query.include_cancelled.unwrap_or(true);

    let generator = OccurrenceGenerator::new(&series.rule, series.series_start_date)
        .with_series_end(series.series_end_date);
    let exceptions = aggregate.exception_set();
    let dates = generator
        .iter_until(range_end)
        .filter(move |date| *date >= range_start);

    let mut total_count = 0;
    let mut views = Vec::new();
    for occurrence in apply_exceptions(dates, &exceptions)
        .filter(|occurrence| include_cancelled || occurrence.is_active())
    {
        total_count += 1;
        if views.len() < limit {
            views.push(occurrence_view(&aggregate, tz, &occurrence));
        }
    }

    tracing::debug!(%range_start, %range_end, total_count, limit, "Listed occurrences");

    Ok(OccurrencesResponse {
        recurrence_rule: series.rule.to_fields(),
        series: aggregate.series.clone(),
        exceptions: aggregate.exceptions.clone(),
        occurrences: views,
        total_count,
    })
}

/// ## Summary
/// The series as RFC 5545 `DTSTART`/`RRULE` text, starting at the master's
/// local time in the series time zone.
///
/// ## Errors
/// Returns `NotFound` for an unknown series and an export error if the series
/// has nothing left to express.
#[tracing::instrument(skip(repo))]
pub async fn export_rrule(repo: &dyn SeriesRepository, series_id: Uuid) -> ServiceResult<RRuleResponse> {
    let aggregate = load_series(repo, series_id).await?;
    let series = &aggregate.series;
    let tz = parse_timezone(&series.timezone)?;
    let start = SeriesStart {
        date: series.series_start_date,
        time: local_time(aggregate.master.start_datetime, tz),
        tz,
    };
    let rrule = to_rrule_text(&series.rule, start, series.series_end_date)?;
    Ok(RRuleResponse { series_id, rrule })
}
