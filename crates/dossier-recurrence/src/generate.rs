//! Occurrence generation.
//!
//! A rule is always evaluated from its anchor (the series start date), one
//! period at a time. Counting from the anchor keeps `occurrence_count`
//! cumulative across pages: asking for a later window never resets the budget.

use std::collections::VecDeque;

use chrono::{Datelike, Days, NaiveDate};

use crate::date::{month_from_index, month_index, ordinal_weekday, week_start};
use crate::rule::{DayOfWeek, MonthlyPattern, Pattern, RecurrenceRule, Termination};

/// Evaluates a [`RecurrenceRule`] anchored at a start date, optionally
/// truncated by a series end date.
///
/// Holds no mutable state; each call starts a fresh walk from the anchor, so
/// identical arguments always produce identical sequences.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceGenerator<'a> {
    rule: &'a RecurrenceRule,
    anchor: NaiveDate,
    series_end: Option<NaiveDate>,
}

impl<'a> OccurrenceGenerator<'a> {
    #[must_use]
    pub fn new(rule: &'a RecurrenceRule, anchor: NaiveDate) -> Self {
        Self {
            rule,
            anchor,
            series_end: None,
        }
    }

    /// Additionally stop at `end` (inclusive), e.g. after a series was split.
    #[must_use]
    pub fn with_series_end(mut self, end: Option<NaiveDate>) -> Self {
        self.series_end = end;
        self
    }

    /// The last date any occurrence could fall on, from the rule's end date
    /// and the series end. `None` when both are open.
    fn last_possible_date(&self) -> Option<NaiveDate> {
        let rule_end = match self.rule.termination {
            Termination::EndDate(end) => Some(end),
            Termination::Count(_) | Termination::Open => None,
        };
        match (rule_end, self.series_end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Ascending occurrences from the anchor up to and including `until`.
    #[must_use]
    pub fn iter_until(&self, until: NaiveDate) -> Occurrences<'a> {
        let limit = self.last_possible_date().map_or(until, |end| end.min(until));
        Occurrences {
            rule: self.rule,
            anchor: self.anchor,
            limit,
            period: 0,
            pending: VecDeque::new(),
            emitted: 0,
            done: false,
        }
    }

    /// Occurrences in `[range_start, range_end]`, ascending and without
    /// duplicates, at most `max_count` of them.
    #[must_use]
    pub fn generate(&self, range_start: NaiveDate, range_end: NaiveDate, max_count: usize) -> Vec<NaiveDate> {
        let dates: Vec<NaiveDate> = self
            .iter_until(range_end)
            .filter(|date| *date >= range_start)
            .take(max_count)
            .collect();
        tracing::trace!(
            anchor = %self.anchor,
            %range_start,
            %range_end,
            generated = dates.len(),
            "Generated occurrences"
        );
        dates
    }

    /// Number of occurrences in `[range_start, range_end]` without materializing them.
    #[must_use]
    pub fn count_between(&self, range_start: NaiveDate, range_end: NaiveDate) -> usize {
        self.iter_until(range_end)
            .filter(|date| *date >= range_start)
            .count()
    }

    /// Whether `date` is one of the generated occurrences.
    #[must_use]
    pub fn produces(&self, date: NaiveDate) -> bool {
        date >= self.anchor && self.iter_until(date).last() == Some(date)
    }

    /// Number of occurrences strictly before `date`.
    #[must_use]
    pub fn count_before(&self, date: NaiveDate) -> usize {
        match date.pred_opt() {
            Some(day_before) if date > self.anchor => self.iter_until(day_before).count(),
            _ => 0,
        }
    }
}

/// Lazy, ascending walk over a rule's occurrences.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    anchor: NaiveDate,
    limit: NaiveDate,
    period: u64,
    pending: VecDeque<NaiveDate>,
    emitted: u32,
    done: bool,
}

impl Occurrences<'_> {
    fn count_exhausted(&self) -> bool {
        match self.rule.termination {
            Termination::Count(count) => self.emitted >= count.get(),
            Termination::EndDate(_) | Termination::Open => false,
        }
    }

    /// First day of period `k` and the candidate dates inside it, or `None`
    /// once the calendar overflows.
    fn period(&self, k: u64) -> Option<(NaiveDate, Vec<NaiveDate>)> {
        let step = k.checked_mul(u64::from(self.rule.interval.get()))?;

        match &self.rule.pattern {
            Pattern::Daily => {
                let date = self.anchor.checked_add_days(Days::new(step))?;
                Some((date, vec![date]))
            }
            Pattern::Weekly { days } => {
                let start = week_start(self.anchor).checked_add_days(Days::new(step.checked_mul(7)?))?;
                let anchor_day = [DayOfWeek::from_chrono(self.anchor.weekday())];
                let offsets: Vec<u64> = if days.is_empty() {
                    anchor_day.iter().map(|d| u64::from(d.index())).collect()
                } else {
                    days.iter().map(|d| u64::from(d.index())).collect()
                };
                let dates = offsets
                    .into_iter()
                    .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                    .collect();
                Some((start, dates))
            }
            Pattern::Monthly(monthly) => {
                let index = month_index(self.anchor).checked_add(i64::try_from(step).ok()?)?;
                let (year, month) = month_from_index(index)?;
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let date = match *monthly {
                    // No clamping: a month without this day has no occurrence.
                    MonthlyPattern::DayOfMonth(day) => NaiveDate::from_ymd_opt(year, month, day),
                    MonthlyPattern::OrdinalWeekday { week, weekday } => {
                        ordinal_weekday(year, month, week, weekday.to_chrono())
                    }
                };
                Some((start, date.into_iter().collect()))
            }
            Pattern::Yearly { month, day } => {
                let year = self.anchor.year().checked_add(i32::try_from(step).ok()?)?;
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                // Feb 29 only exists in leap years; other years are skipped.
                let date = NaiveDate::from_ymd_opt(year, *month, *day);
                Some((start, date.into_iter().collect()))
            }
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            if self.done || self.count_exhausted() {
                self.done = true;
                return None;
            }

            if let Some(date) = self.pending.pop_front() {
                if date > self.limit {
                    self.done = true;
                    return None;
                }
                self.emitted += 1;
                return Some(date);
            }

            let Some((period_start, candidates)) = self.period(self.period) else {
                self.done = true;
                return None;
            };
            if period_start > self.limit {
                self.done = true;
                return None;
            }
            self.period += 1;
            self.pending
                .extend(candidates.into_iter().filter(|date| *date >= self.anchor));
        }
    }
}
