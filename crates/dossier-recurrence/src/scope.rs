//! Turning a scoped edit or delete into a mutation plan.
//!
//! The resolver never touches storage. It inspects the series as it is now and
//! describes what has to change; the persistence layer applies the plan as one
//! unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::generate::OccurrenceGenerator;
use crate::overlay::{ExceptionSet, ExceptionType};
use crate::rule::{RecurrenceRule, RulePatch, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    Single,
    ThisAndFuture,
    All,
}

/// The parts of a stored series the resolver needs.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSnapshot<'a> {
    pub rule: &'a RecurrenceRule,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub exceptions: &'a ExceptionSet,
}

impl<'a> SeriesSnapshot<'a> {
    #[must_use]
    pub fn generator(&self) -> OccurrenceGenerator<'a> {
        OccurrenceGenerator::new(self.rule, self.start).with_series_end(self.end)
    }
}

/// What the caller wants to do. `F` carries the record fields being changed
/// (title, location, times, ...), opaque to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesEdit<F> {
    Update { fields: F, rule_patch: RulePatch },
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest<F> {
    pub scope: EditScope,
    pub occurrence_date: Option<NaiveDate>,
    pub edit: SeriesEdit<F>,
}

/// Series created by a "this and future" edit, starting at the edit date.
#[derive(Debug, Clone, PartialEq)]
pub struct Successor<F> {
    pub rule: RecurrenceRule,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub fields: F,
    /// Exceptions of the original series that move to the successor.
    pub carried_exceptions: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationPlan<F> {
    /// Replace the rule and the master record of the whole series.
    RewriteSeries {
        rule: RecurrenceRule,
        fields: F,
        /// Exceptions on dates the new rule no longer produces.
        dropped_exceptions: Vec<NaiveDate>,
    },
    /// Remove the series, its master record and all exceptions.
    DeleteSeries,
    /// Create or replace the exception at `date`.
    UpsertException {
        date: NaiveDate,
        exception_type: ExceptionType,
        fields: Option<F>,
    },
    /// End the original series at `truncate_end` and, for edits, start a new one.
    Split {
        truncate_end: NaiveDate,
        successor: Option<Successor<F>>,
        /// Exceptions on or after the split date that are removed outright.
        dropped_exceptions: Vec<NaiveDate>,
    },
}

impl<F> MutationPlan<F> {
    /// ## Summary
    /// Number of occurrences up to `horizon` this plan affects.
    ///
    /// For rewrites this counts the occurrences of the new rule, for deletes
    /// and splits the occurrences of the original series that are replaced or
    /// removed, and a single-date exception always counts as one.
    #[must_use]
    pub fn affected_occurrences(&self, series: &SeriesSnapshot<'_>, horizon: NaiveDate) -> usize {
        match self {
            Self::RewriteSeries { rule, .. } => OccurrenceGenerator::new(rule, series.start)
                .with_series_end(series.end)
                .iter_until(horizon)
                .count(),
            Self::DeleteSeries => series.generator().iter_until(horizon).count(),
            Self::UpsertException { .. } => 1,
            Self::Split { truncate_end, .. } => series
                .generator()
                .iter_until(horizon)
                .filter(|date| date > truncate_end)
                .count(),
        }
    }
}

fn invalid_edit(en: &str, ar: &str) -> RecurrenceError {
    RecurrenceError::InvalidEdit(dossier_core::Bilingual::new(en, ar))
}

/// ## Summary
/// Decide which stored entities an edit or delete changes.
///
/// ## Errors
/// - `InvalidEdit` if a `single`/`this_and_future` request has no occurrence
///   date, or a `single` edit tries to change the rule.
/// - `NotAnOccurrence` if the occurrence date is not generated by the series.
/// - `InvalidRule` if the rule patch does not produce a valid rule.
pub fn resolve<F>(series: &SeriesSnapshot<'_>, request: EditRequest<F>) -> RecurrenceResult<MutationPlan<F>> {
    let EditRequest {
        scope,
        occurrence_date,
        edit,
    } = request;

    if scope == EditScope::All {
        return resolve_all(series, edit);
    }

    let date = occurrence_date.ok_or_else(|| {
        invalid_edit(
            "occurrence_date is required for single and this_and_future edits",
            "تاريخ الموعد مطلوب عند تعديل موعد واحد أو هذا الموعد وما يليه",
        )
    })?;
    if !series.generator().produces(date) {
        return Err(RecurrenceError::NotAnOccurrence { date });
    }

    match scope {
        EditScope::Single => resolve_single(date, edit),
        EditScope::ThisAndFuture if date == series.start => {
            tracing::debug!(%date, "Split at series start, treating as whole-series edit");
            resolve_all(series, edit)
        }
        EditScope::ThisAndFuture => resolve_split(series, date, edit),
        EditScope::All => resolve_all(series, edit),
    }
}

fn resolve_all<F>(series: &SeriesSnapshot<'_>, edit: SeriesEdit<F>) -> RecurrenceResult<MutationPlan<F>> {
    let SeriesEdit::Update { fields, rule_patch } = edit else {
        return Ok(MutationPlan::DeleteSeries);
    };

    let rule = if rule_patch.is_empty() {
        series.rule.clone()
    } else {
        series.rule.patched(&rule_patch, series.start)?
    };

    let generator = OccurrenceGenerator::new(&rule, series.start).with_series_end(series.end);
    let dropped_exceptions = series
        .exceptions
        .dates()
        .filter(|date| !generator.produces(*date))
        .collect();

    Ok(MutationPlan::RewriteSeries {
        rule,
        fields,
        dropped_exceptions,
    })
}

fn resolve_single<F>(date: NaiveDate, edit: SeriesEdit<F>) -> RecurrenceResult<MutationPlan<F>> {
    match edit {
        SeriesEdit::Delete => Ok(MutationPlan::UpsertException {
            date,
            exception_type: ExceptionType::Cancelled,
            fields: None,
        }),
        SeriesEdit::Update { rule_patch, .. } if !rule_patch.is_empty() => Err(invalid_edit(
            "The recurrence pattern cannot be changed for a single occurrence",
            "لا يمكن تغيير نمط التكرار لموعد واحد",
        )),
        SeriesEdit::Update { fields, .. } => Ok(MutationPlan::UpsertException {
            date,
            exception_type: ExceptionType::Modified,
            fields: Some(fields),
        }),
    }
}

fn resolve_split<F>(
    series: &SeriesSnapshot<'_>,
    date: NaiveDate,
    edit: SeriesEdit<F>,
) -> RecurrenceResult<MutationPlan<F>> {
    // `date` is produced and later than the start, so the day before exists.
    let truncate_end = date
        .pred_opt()
        .ok_or(RecurrenceError::NotAnOccurrence { date })?;

    let SeriesEdit::Update { fields, rule_patch } = edit else {
        return Ok(MutationPlan::Split {
            truncate_end,
            successor: None,
            dropped_exceptions: series.exceptions.dates().filter(|d| *d >= date).collect(),
        });
    };

    let rule = successor_rule(series, date, &rule_patch)?;
    let generator = OccurrenceGenerator::new(&rule, date).with_series_end(series.end);

    // The edit itself replaces whatever override the split date carried.
    let (carried_exceptions, dropped_exceptions): (Vec<_>, Vec<_>) = series
        .exceptions
        .dates()
        .filter(|d| *d >= date)
        .partition(|d| *d > date && generator.produces(*d));

    Ok(MutationPlan::Split {
        truncate_end,
        successor: Some(Successor {
            rule,
            start: date,
            end: series.end,
            fields,
            carried_exceptions,
        }),
        dropped_exceptions,
    })
}

/// The original rule re-anchored at `date`: a count termination keeps only
/// the occurrences that were still to come, then the patch is applied.
fn successor_rule(series: &SeriesSnapshot<'_>, date: NaiveDate, patch: &RulePatch) -> RecurrenceResult<RecurrenceRule> {
    let mut rule = series.rule.clone();
    if let Termination::Count(total) = rule.termination {
        let before = u32::try_from(series.generator().count_before(date)).unwrap_or(u32::MAX);
        let remaining = total
            .get()
            .checked_sub(before)
            .and_then(std::num::NonZeroU32::new)
            .ok_or(RecurrenceError::NotAnOccurrence { date })?;
        rule.termination = Termination::Count(remaining);
    }

    if patch.is_empty() {
        Ok(rule)
    } else {
        rule.patched(patch, date)
    }
}
