//! Per-date exceptions layered over generated occurrences.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    Cancelled,
    Modified,
    Rescheduled,
}

impl ExceptionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Modified => "modified",
            Self::Rescheduled => "rescheduled",
        }
    }

    /// Status an occurrence takes when this exception applies to it.
    #[must_use]
    pub const fn status(self) -> OccurrenceStatus {
        match self {
            Self::Cancelled => OccurrenceStatus::Cancelled,
            Self::Modified | Self::Rescheduled => OccurrenceStatus::Modified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Scheduled,
    Modified,
    Cancelled,
}

/// What an exception records about its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionMark {
    pub exception_type: ExceptionType,
    /// Record whose content overrides the series defaults on this date.
    pub replacement: Option<Uuid>,
}

/// Exceptions of one series keyed by their nominal occurrence date.
///
/// A date holds at most one exception; registering another one for the same
/// date replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    marks: BTreeMap<NaiveDate, ExceptionMark>,
}

impl ExceptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the exception for `date`, returning the one it replaced.
    pub fn register(&mut self, date: NaiveDate, mark: ExceptionMark) -> Option<ExceptionMark> {
        self.marks.insert(date, mark)
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<ExceptionMark> {
        self.marks.remove(&date)
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&ExceptionMark> {
        self.marks.get(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.marks.keys().copied()
    }

    /// The generated `date` with its exception, if any, applied.
    #[must_use]
    pub fn occurrence(&self, date: NaiveDate) -> Occurrence {
        match self.get(date) {
            Some(mark) => Occurrence {
                date,
                status: mark.exception_type.status(),
                exception_type: Some(mark.exception_type),
                replacement: mark.replacement,
            },
            None => Occurrence {
                date,
                status: OccurrenceStatus::Scheduled,
                exception_type: None,
                replacement: None,
            },
        }
    }
}

impl FromIterator<(NaiveDate, ExceptionMark)> for ExceptionSet {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, ExceptionMark)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (date, mark) in iter {
            set.register(date, mark);
        }
        set
    }
}

/// A generated date with its exception status applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub exception_type: Option<ExceptionType>,
    pub replacement: Option<Uuid>,
}

impl Occurrence {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != OccurrenceStatus::Cancelled
    }
}

/// ## Summary
/// Overlay `exceptions` on generated `dates`, preserving their order.
///
/// Lazy, so a caller can count a long window without holding it. Exceptions
/// on dates that are not in `dates` are ignored; cancelled dates stay in the
/// result with status `Cancelled`.
pub fn apply_exceptions<'a, I>(dates: I, exceptions: &'a ExceptionSet) -> impl Iterator<Item = Occurrence> + 'a
where
    I: IntoIterator<Item = NaiveDate> + 'a,
    I::IntoIter: 'a,
{
    dates.into_iter().map(|date| exceptions.occurrence(date))
}
