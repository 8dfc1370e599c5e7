//! RFC 5545 `DTSTART`/`RRULE` rendering of a series.
//!
//! The text is round-tripped through the `rrule` crate before it is handed
//! out, so callers never receive something other calendar software rejects.

use chrono::{Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::generate::OccurrenceGenerator;
use crate::rule::{DayOfWeek, MonthlyPattern, Pattern, RecurrenceRule, Termination};

const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

fn weekday_code(day: DayOfWeek) -> &'static str {
    WEEKDAY_CODES
        .get(usize::from(day.index()))
        .copied()
        .unwrap_or("SU")
}

/// Local start of a series: its anchor date at the master's time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStart {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tz: Tz,
}

impl SeriesStart {
    fn dtstart(&self) -> String {
        let local = self.date.and_time(self.time).format("%Y%m%dT%H%M%S");
        if self.tz == Tz::UTC {
            format!("DTSTART:{local}Z")
        } else {
            format!("DTSTART;TZID={}:{local}", self.tz)
        }
    }

    /// `UNTIL` at the end of `date` in the series zone, written in UTC.
    fn until(&self, date: NaiveDate) -> String {
        let end_of_day = date
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
        let utc = match self.tz.from_local_datetime(&end_of_day) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.naive_utc(),
            LocalResult::None => {
                tracing::warn!(tz = %self.tz, %end_of_day, "End of day does not exist locally, using it as UTC");
                end_of_day
            }
        };
        format!("UNTIL={}", utc_stamp(utc))
    }
}

fn utc_stamp(instant: NaiveDateTime) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// ## Summary
/// Render a series as `DTSTART` + `RRULE` lines.
///
/// `DTSTART` carries the local start time, with `TZID` outside UTC. Weeks
/// start on Sunday (`WKST=SU`). A series end narrower than the rule's own
/// termination is expressed as `UNTIL` on the last remaining occurrence.
///
/// ## Errors
/// Returns `Export` if the series has no occurrences left or the `rrule`
/// crate rejects the rendered text.
pub fn to_rrule_text(rule: &RecurrenceRule, start: SeriesStart, series_end: Option<NaiveDate>) -> RecurrenceResult<String> {
    let anchor = start.date;
    let mut line = format!("RRULE:FREQ={};INTERVAL={}", frequency_code(&rule.pattern), rule.interval);

    match &rule.pattern {
        Pattern::Daily => {}
        Pattern::Weekly { days } => {
            let codes: Vec<&str> = if days.is_empty() {
                vec![weekday_code(DayOfWeek::from_chrono(anchor.weekday()))]
            } else {
                days.iter().map(|d| weekday_code(*d)).collect()
            };
            line.push_str(&format!(";WKST=SU;BYDAY={}", codes.join(",")));
        }
        Pattern::Monthly(MonthlyPattern::DayOfMonth(day)) => {
            line.push_str(&format!(";BYMONTHDAY={day}"));
        }
        Pattern::Monthly(MonthlyPattern::OrdinalWeekday { week, weekday }) => {
            let ordinal = week.ordinal().map_or(-1, i32::from);
            line.push_str(&format!(";BYDAY={ordinal}{}", weekday_code(*weekday)));
        }
        Pattern::Yearly { month, day } => {
            line.push_str(&format!(";BYMONTH={month};BYMONTHDAY={day}"));
        }
    }

    let termination = match (rule.termination, series_end) {
        (Termination::Count(count), None) => format!("COUNT={count}"),
        (Termination::Count(_), Some(_)) => {
            let generator = OccurrenceGenerator::new(rule, anchor).with_series_end(series_end);
            let last = series_end
                .and_then(|end| generator.iter_until(end).last())
                .ok_or_else(|| RecurrenceError::Export("series has no remaining occurrences".to_string()))?;
            start.until(last)
        }
        (Termination::EndDate(end), series_end) => start.until(series_end.map_or(end, |s| s.min(end))),
        (Termination::Open, Some(end)) => start.until(end),
        (Termination::Open, None) => String::new(),
    };
    if !termination.is_empty() {
        line.push(';');
        line.push_str(&termination);
    }

    let text = format!("{}\n{line}", start.dtstart());
    parse_rrule_text(&text)?;
    tracing::trace!(rrule = %text, "Rendered RRULE");
    Ok(text)
}

fn frequency_code(pattern: &Pattern) -> &'static str {
    match pattern {
        Pattern::Daily => "DAILY",
        Pattern::Weekly { .. } => "WEEKLY",
        Pattern::Monthly(_) => "MONTHLY",
        Pattern::Yearly { .. } => "YEARLY",
    }
}

/// ## Errors
/// Returns `Export` with the parser's message if the text is not a valid rule set.
pub fn parse_rrule_text(text: &str) -> RecurrenceResult<RRuleSet> {
    text.parse::<RRuleSet>()
        .map_err(|err| RecurrenceError::Export(err.to_string()))
}

/// Expand RRULE text with the `rrule` crate into calendar dates (UTC).
///
/// ## Errors
/// Returns `Export` if the text does not parse.
pub fn expand_rrule_text(text: &str, limit: u16) -> RecurrenceResult<Vec<NaiveDate>> {
    Ok(parse_rrule_text(text)?
        .all(limit)
        .dates
        .iter()
        .map(|dt| dt.date_naive())
        .collect())
}
