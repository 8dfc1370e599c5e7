//! Recurrence expansion for calendar series.
//!
//! ## Summary
//! A [`RecurrenceRule`] anchored at a start date is expanded into dates by
//! [`OccurrenceGenerator`], per-date exceptions are layered on with
//! [`apply_exceptions`], and [`resolve`] turns a scoped edit into a
//! [`MutationPlan`] for the persistence layer. Everything here is pure and
//! synchronous.

pub mod date;
pub mod error;
pub mod export;
pub mod generate;
pub mod overlay;
pub mod rule;
pub mod scope;

pub use error::{RecurrenceError, RecurrenceResult};
pub use export::{SeriesStart, expand_rrule_text, parse_rrule_text, to_rrule_text};
pub use generate::{OccurrenceGenerator, Occurrences};
pub use overlay::{
    ExceptionMark, ExceptionSet, ExceptionType, Occurrence, OccurrenceStatus, apply_exceptions,
};
pub use rule::{
    DayOfWeek, Frequency, MonthlyPattern, Pattern, RecurrenceRule, RuleFields, RulePatch,
    Termination, WeekOfMonth,
};
pub use scope::{
    EditRequest, EditScope, MutationPlan, SeriesEdit, SeriesSnapshot, Successor, resolve,
};
