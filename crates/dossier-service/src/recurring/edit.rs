//! Scoped edits, deletes, and per-date exceptions.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use dossier_core::bilingual;
use dossier_db::db::SeriesRepository;
use dossier_db::model::series::{Series, SeriesAggregate, SeriesChange, SeriesException};
use dossier_recurrence::{
    EditRequest, ExceptionSet, ExceptionType, MutationPlan, OccurrenceGenerator, RecurrenceError, SeriesEdit,
    SeriesSnapshot, Successor, resolve,
};
use uuid::Uuid;

use super::entry::{parse_timezone, rebase_master, replacement_entry};
use super::load_series;
use super::types::{
    AddExceptionRequest, DeleteSeriesRequest, DeleteSeriesResponse, EntryUpdates,
    UpdateSeriesRequest, UpdateSeriesResponse,
};
use crate::error::{ServiceError, ServiceResult, validation};

#[derive(Debug, Default)]
struct Reason {
    en: Option<String>,
    ar: Option<String>,
}

/// Changes applying a resolved plan, plus the id of a split-off series.
struct PlannedChanges {
    changes: Vec<SeriesChange>,
    new_series_id: Option<Uuid>,
    dropped_exceptions: Vec<NaiveDate>,
}

fn delete_exceptions(series_id: Uuid, dates: &[NaiveDate]) -> impl Iterator<Item = SeriesChange> + '_ {
    dates
        .iter()
        .map(move |date| SeriesChange::DeleteException {
            series_id,
            date: *date,
        })
}

/// Guard for plans that do not rewrite the series row.
fn claim(series: &Series) -> SeriesChange {
    SeriesChange::ClaimVersion {
        id: series.id,
        expected: series.version,
    }
}

fn exception_record(
    aggregate: &SeriesAggregate,
    date: NaiveDate,
    exception_type: ExceptionType,
    replacement_entry_id: Option<Uuid>,
    reason: Reason,
    now: DateTime<Utc>,
) -> SeriesException {
    let existing = aggregate.exception_at(date);
    SeriesException {
        id: existing.map_or_else(Uuid::now_v7, |e| e.id),
        series_id: aggregate.series.id,
        exception_date: date,
        exception_type,
        replacement_entry_id,
        reason_en: reason.en,
        reason_ar: reason.ar,
        created_at: existing.map_or(now, |e| e.created_at),
    }
}

fn upsert_exception(
    aggregate: &SeriesAggregate,
    tz: Tz,
    date: NaiveDate,
    exception_type: ExceptionType,
    updates: Option<&EntryUpdates>,
    reason: Reason,
    now: DateTime<Utc>,
) -> ServiceResult<SeriesChange> {
    let replacement = match (exception_type, updates) {
        (ExceptionType::Cancelled, _) | (_, None) => None,
        (_, Some(updates)) => {
            let existing = aggregate
                .exception_at(date)
                .and_then(|e| e.replacement_entry_id)
                .and_then(|id| aggregate.replacement(id));
            Some(replacement_entry(&aggregate.master, existing, updates, tz, date, now)?)
        }
    };
    let exception = exception_record(
        aggregate,
        date,
        exception_type,
        replacement.as_ref().map(|entry| entry.id),
        reason,
        now,
    );
    Ok(SeriesChange::UpsertException {
        exception,
        replacement,
    })
}

fn split_off(
    aggregate: &SeriesAggregate,
    tz: Tz,
    successor: Successor<EntryUpdates>,
    now: DateTime<Utc>,
) -> ServiceResult<(Vec<SeriesChange>, Uuid)> {
    let original = &aggregate.series;
    let series_id = Uuid::now_v7();
    let mut master = rebase_master(&aggregate.master, &successor.fields, tz, successor.start, now)?;
    master.id = Uuid::now_v7();
    master.series_id = Some(series_id);
    master.created_at = now;

    let series = Series {
        id: series_id,
        master_entry_id: master.id,
        rule: successor.rule,
        series_start_date: successor.start,
        series_end_date: successor.end,
        timezone: original.timezone.clone(),
        generated_until: original.generated_until.max(successor.start),
        parent_series_id: Some(original.id),
        version: 1,
        created_at: now,
        updated_at: now,
    };

    let mut changes = vec![SeriesChange::InsertSeries { series, master }];
    changes.extend(
        successor
            .carried_exceptions
            .iter()
            .map(|date| SeriesChange::MoveException {
                from: original.id,
                to: series_id,
                date: *date,
            }),
    );
    Ok((changes, series_id))
}

fn plan_changes(
    aggregate: &SeriesAggregate,
    tz: Tz,
    plan: MutationPlan<EntryUpdates>,
    reason: Reason,
    now: DateTime<Utc>,
) -> ServiceResult<PlannedChanges> {
    let series = &aggregate.series;
    let mut new_series_id = None;

    let (changes, dropped_exceptions) = match plan {
        MutationPlan::RewriteSeries {
            rule,
            fields,
            dropped_exceptions,
        } => {
            let master = rebase_master(&aggregate.master, &fields, tz, series.series_start_date, now)?;
            let mut changes = vec![
                SeriesChange::UpdateSeries(Series {
                    rule,
                    updated_at: now,
                    ..series.clone()
                }),
                SeriesChange::UpdateEntry(master),
            ];
            changes.extend(delete_exceptions(series.id, &dropped_exceptions));
            (changes, dropped_exceptions)
        }
        MutationPlan::DeleteSeries => (
            vec![claim(series), SeriesChange::DeleteSeries(series.id)],
            Vec::new(),
        ),
        MutationPlan::UpsertException {
            date,
            exception_type,
            fields,
        } => {
            let change = upsert_exception(aggregate, tz, date, exception_type, fields.as_ref(), reason, now)?;
            (vec![claim(series), change], Vec::new())
        }
        MutationPlan::Split {
            truncate_end,
            successor,
            dropped_exceptions,
        } => {
            let mut changes = Vec::new();
            if let Some(successor) = successor {
                let (split, id) = split_off(aggregate, tz, successor, now)?;
                changes.extend(split);
                new_series_id = Some(id);
            }
            changes.push(SeriesChange::UpdateSeries(Series {
                series_end_date: Some(truncate_end),
                updated_at: now,
                ..series.clone()
            }));
            changes.extend(delete_exceptions(series.id, &dropped_exceptions));
            (changes, dropped_exceptions)
        }
    };

    Ok(PlannedChanges {
        changes,
        new_series_id,
        dropped_exceptions,
    })
}

fn snapshot_of<'a>(aggregate: &'a SeriesAggregate, exceptions: &'a ExceptionSet) -> SeriesSnapshot<'a> {
    SeriesSnapshot {
        rule: &aggregate.series.rule,
        start: aggregate.series.series_start_date,
        end: aggregate.series.series_end_date,
        exceptions,
    }
}

/// ## Summary
/// Edit one occurrence, an occurrence and everything after it, or the
/// whole series.
///
/// ## Side Effects
/// Applies the resolved plan atomically. A "this and future" edit inserts a
/// new series and moves the later exceptions onto it.
///
/// ## Errors
/// - `NotFound` for an unknown series.
/// - `RecurrenceError` if the scope is missing its date, the date is not an
///   occurrence, or the rule update is invalid.
/// - A validation error if the updated times are reversed.
#[tracing::instrument(skip(repo, request), fields(scope = ?request.edit_options.scope))]
pub async fn update_series(
    repo: &dyn SeriesRepository,
    series_id: Uuid,
    request: UpdateSeriesRequest,
    now: DateTime<Utc>,
) -> ServiceResult<UpdateSeriesResponse> {
    let aggregate = load_series(repo, series_id).await?;
    let tz = parse_timezone(&aggregate.series.timezone)?;
    let exceptions = aggregate.exception_set();
    let snapshot = snapshot_of(&aggregate, &exceptions);

    let plan = resolve(
        &snapshot,
        EditRequest {
            scope: request.edit_options.scope,
            occurrence_date: request.edit_options.occurrence_date,
            edit: SeriesEdit::Update {
                fields: request.updates,
                rule_patch: request.recurrence_updates.unwrap_or_default(),
            },
        },
    )?;
    let updated_count = plan.affected_occurrences(&snapshot, aggregate.series.generated_until);
    let planned = plan_changes(&aggregate, tz, plan, Reason::default(), now)?;

    repo.apply_changes(planned.changes).await?;

    tracing::info!(
        updated_count,
        new_series_id = ?planned.new_series_id,
        dropped = planned.dropped_exceptions.len(),
        "Updated recurring series"
    );

    Ok(UpdateSeriesResponse {
        series_id,
        updated_count,
        new_series_id: planned.new_series_id,
        dropped_exceptions: planned.dropped_exceptions,
    })
}

/// ## Summary
/// Cancel one occurrence, end the series before an occurrence, or delete it.
///
/// ## Side Effects
/// A single-date delete records a cancellation carrying the reason.
///
/// ## Errors
/// - `NotFound` for an unknown series.
/// - `RecurrenceError` if the scope is missing its date or the date is not
///   an occurrence.
#[tracing::instrument(skip(repo, request), fields(scope = ?request.edit_options.scope))]
pub async fn delete_series(
    repo: &dyn SeriesRepository,
    series_id: Uuid,
    request: DeleteSeriesRequest,
    now: DateTime<Utc>,
) -> ServiceResult<DeleteSeriesResponse> {
    let aggregate = load_series(repo, series_id).await?;
    let tz = parse_timezone(&aggregate.series.timezone)?;
    let exceptions = aggregate.exception_set();
    let snapshot = snapshot_of(&aggregate, &exceptions);

    let plan = resolve::<EntryUpdates>(
        &snapshot,
        EditRequest {
            scope: request.edit_options.scope,
            occurrence_date: request.edit_options.occurrence_date,
            edit: SeriesEdit::Delete,
        },
    )?;
    let deleted_count = plan.affected_occurrences(&snapshot, aggregate.series.generated_until);
    let reason = Reason {
        en: request.reason_en,
        ar: request.reason_ar,
    };
    let planned = plan_changes(&aggregate, tz, plan, reason, now)?;

    repo.apply_changes(planned.changes).await?;

    tracing::info!(deleted_count, "Deleted from recurring series");

    Ok(DeleteSeriesResponse {
        series_id,
        deleted_count,
    })
}

/// ## Summary
/// Record (or replace) the exception on one occurrence date.
///
/// ## Errors
/// - `NotFound` for an unknown series.
/// - `NotAnOccurrence` if the series does not produce the date.
/// - A validation error for a cancellation that carries a replacement.
#[tracing::instrument(skip(repo, request), fields(
    exception_date = %request.exception_date,
    exception_type = request.exception_type.as_str()
))]
pub async fn add_exception(
    repo: &dyn SeriesRepository,
    series_id: Uuid,
    request: AddExceptionRequest,
    now: DateTime<Utc>,
) -> ServiceResult<SeriesException> {
    if request.exception_type == ExceptionType::Cancelled && request.replacement_event.is_some() {
        return Err(validation(
            "A cancelled occurrence cannot have a replacement event",
            "لا يمكن أن يكون للموعد الملغى حدث بديل",
        ));
    }

    let aggregate = load_series(repo, series_id).await?;
    let tz = parse_timezone(&aggregate.series.timezone)?;
    let series = &aggregate.series;
    let date = request.exception_date;
    let produced = OccurrenceGenerator::new(&series.rule, series.series_start_date)
        .with_series_end(series.series_end_date)
        .produces(date);
    if !produced {
        return Err(RecurrenceError::NotAnOccurrence { date }.into());
    }

    let change = upsert_exception(
        &aggregate,
        tz,
        date,
        request.exception_type,
        request.replacement_event.as_ref(),
        Reason {
            en: request.reason_en,
            ar: request.reason_ar,
        },
        now,
    )?;
    let SeriesChange::UpsertException { exception, .. } = &change else {
        return Err(ServiceError::InvariantViolation("exception upsert produced another change"));
    };
    let exception = exception.clone();

    repo.apply_changes(vec![claim(series), change]).await?;
    tracing::info!(exception_id = %exception.id, "Recorded series exception");
    Ok(exception)
}

/// ## Summary
/// Remove the exception on `date`, restoring the generated occurrence.
///
/// ## Errors
/// Returns `NotFound` for an unknown series or a date without an exception.
#[tracing::instrument(skip(repo))]
pub async fn remove_exception(repo: &dyn SeriesRepository, series_id: Uuid, date: NaiveDate) -> ServiceResult<()> {
    let aggregate = load_series(repo, series_id).await?;
    if aggregate.exception_at(date).is_none() {
        return Err(ServiceError::NotFound(bilingual!(
            "No exception on {} for this series",
            "لا يوجد استثناء بتاريخ {} لهذه السلسلة",
            date
        )));
    }
    repo.apply_changes(vec![
        claim(&aggregate.series),
        SeriesChange::DeleteException { series_id, date },
    ])
    .await?;
    tracing::info!("Removed series exception");
    Ok(())
}
