//! Recurrence rule types.
//!
//! Clients send rules as a flat record ([`RuleFields`]) where several fields
//! only make sense for some frequencies. At the boundary that record is
//! converted into [`RecurrenceRule`], whose enums make the invalid
//! combinations (two monthly modes, both an end date and a count)
//! unrepresentable.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::date::weekday_from_sunday_index;
use crate::error::{RecurrenceError, RecurrenceResult, invalid_rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// 1-based ordinal, `None` for `Last`.
    #[must_use]
    pub const fn ordinal(self) -> Option<u8> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }
}

/// Weekday numbered from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    #[must_use]
    pub fn from_chrono(weekday: Weekday) -> Self {
        // num_days_from_sunday is always < 7
        Self(u8::try_from(weekday.num_days_from_sunday()).unwrap_or_default())
    }

    #[must_use]
    pub fn to_chrono(self) -> Weekday {
        weekday_from_sunday_index(self.0).unwrap_or(Weekday::Sun)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = RecurrenceError;

    fn try_from(value: u8) -> RecurrenceResult<Self> {
        if value <= 6 {
            Ok(Self(value))
        } else {
            Err(invalid_rule(
                "Weekday indices must be between 0 (Sunday) and 6 (Saturday)",
                "يجب أن تكون أرقام أيام الأسبوع بين 0 (الأحد) و6 (السبت)",
            ))
        }
    }
}

impl From<DayOfWeek> for u8 {
    fn from(value: DayOfWeek) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyPattern {
    /// The n-th day of the month; months without that day are skipped.
    DayOfMonth(u32),
    /// An ordinal weekday such as "third Tuesday" or "last Friday".
    OrdinalWeekday { week: WeekOfMonth, weekday: DayOfWeek },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Daily,
    /// Empty `days` means "the anchor date's weekday".
    Weekly { days: BTreeSet<DayOfWeek> },
    Monthly(MonthlyPattern),
    Yearly { month: u32, day: u32 },
}

impl Pattern {
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly { .. } => Frequency::Weekly,
            Self::Monthly(_) => Frequency::Monthly,
            Self::Yearly { .. } => Frequency::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Inclusive last date.
    EndDate(NaiveDate),
    /// Total number of occurrences, counted from the rule's anchor.
    Count(NonZeroU32),
    /// No end; callers bound generation with a horizon.
    Open,
}

/// A validated recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleFields", into = "RuleFields")]
pub struct RecurrenceRule {
    pub pattern: Pattern,
    pub interval: NonZeroU32,
    pub termination: Termination,
}

impl RecurrenceRule {
    #[must_use]
    pub fn new(pattern: Pattern, interval: NonZeroU32, termination: Termination) -> Self {
        Self {
            pattern,
            interval,
            termination,
        }
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.pattern.frequency()
    }

    /// The flat wire representation of this rule.
    #[must_use]
    pub fn to_fields(&self) -> RuleFields {
        RuleFields::from(self.clone())
    }

    /// Checks the rule against the date it will be anchored at.
    ///
    /// ## Errors
    /// Returns `InvalidRule` if the end date precedes the anchor.
    pub fn validate_anchor(&self, anchor: NaiveDate) -> RecurrenceResult<()> {
        match self.termination {
            Termination::EndDate(end) if end < anchor => Err(invalid_rule(
                "The recurrence end date must not be before the start date",
                "يجب ألا يسبق تاريخ انتهاء التكرار تاريخ البدء",
            )),
            _ => Ok(()),
        }
    }

    /// Applies a partial update and re-validates the result.
    ///
    /// ## Errors
    /// Returns `InvalidRule` if the patched fields no longer form a valid rule.
    pub fn patched(&self, patch: &RulePatch, anchor: NaiveDate) -> RecurrenceResult<Self> {
        let fields = self.to_fields().merge(patch).with_anchor_defaults(anchor);
        let rule = Self::try_from(fields)?;
        rule.validate_anchor(anchor)?;
        Ok(rule)
    }
}

fn default_interval() -> u32 {
    1
}

/// Flat recurrence record as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFields {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval_count: u32,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub week_of_month: Option<WeekOfMonth>,
    #[serde(default)]
    pub day_of_week_monthly: Option<u8>,
    #[serde(default)]
    pub month_of_year: Option<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub occurrence_count: Option<u32>,
}

impl RuleFields {
    /// Fills the fields a client may leave implicit from the anchor date:
    /// the day of month for monthly rules without a mode, and the month/day
    /// for yearly rules.
    #[must_use]
    pub fn with_anchor_defaults(mut self, anchor: NaiveDate) -> Self {
        match self.frequency {
            Frequency::Monthly => {
                if self.day_of_month.is_none() && self.week_of_month.is_none() {
                    self.day_of_month = Some(anchor.day());
                }
            }
            Frequency::Yearly => {
                self.month_of_year.get_or_insert(anchor.month());
                self.day_of_month.get_or_insert(anchor.day());
            }
            Frequency::Daily | Frequency::Weekly => {}
        }
        self
    }

    /// Overlays a partial update. Setting one monthly mode clears the other,
    /// and setting one termination field clears the other.
    #[must_use]
    pub fn merge(mut self, patch: &RulePatch) -> Self {
        if let Some(frequency) = patch.frequency {
            if frequency != self.frequency {
                self.days_of_week.clear();
                self.day_of_month = None;
                self.week_of_month = None;
                self.day_of_week_monthly = None;
                self.month_of_year = None;
            }
            self.frequency = frequency;
        }
        if let Some(interval) = patch.interval_count {
            self.interval_count = interval;
        }
        if let Some(days) = &patch.days_of_week {
            self.days_of_week.clone_from(days);
        }
        if let Some(day) = patch.day_of_month {
            self.day_of_month = Some(day);
            if self.frequency == Frequency::Monthly {
                self.week_of_month = None;
                self.day_of_week_monthly = None;
            }
        }
        if patch.week_of_month.is_some() || patch.day_of_week_monthly.is_some() {
            if let Some(week) = patch.week_of_month {
                self.week_of_month = Some(week);
            }
            if let Some(weekday) = patch.day_of_week_monthly {
                self.day_of_week_monthly = Some(weekday);
            }
            if patch.day_of_month.is_none() {
                self.day_of_month = None;
            }
        }
        if let Some(month) = patch.month_of_year {
            self.month_of_year = Some(month);
        }
        if let Some(end) = patch.end_date {
            self.end_date = Some(end);
            self.occurrence_count = None;
        }
        if let Some(count) = patch.occurrence_count {
            self.occurrence_count = Some(count);
            self.end_date = None;
        }
        self
    }
}

/// Partial rule update used by "all" and "this and future" edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePatch {
    pub frequency: Option<Frequency>,
    pub interval_count: Option<u32>,
    pub days_of_week: Option<Vec<u8>>,
    pub day_of_month: Option<u32>,
    pub week_of_month: Option<WeekOfMonth>,
    pub day_of_week_monthly: Option<u8>,
    pub month_of_year: Option<u32>,
    pub end_date: Option<NaiveDate>,
    pub occurrence_count: Option<u32>,
}

impl RulePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn day_of_month(value: u32) -> RecurrenceResult<u32> {
    if (1..=31).contains(&value) {
        Ok(value)
    } else {
        Err(invalid_rule(
            "day_of_month must be between 1 and 31",
            "يجب أن يكون يوم الشهر بين 1 و31",
        ))
    }
}

fn monthly_pattern(fields: &RuleFields) -> RecurrenceResult<MonthlyPattern> {
    match (fields.day_of_month, fields.week_of_month, fields.day_of_week_monthly) {
        (Some(_), Some(_), _) => Err(invalid_rule(
            "A monthly rule takes either day_of_month or week_of_month, not both",
            "تأخذ القاعدة الشهرية يوم الشهر أو أسبوع الشهر، وليس كليهما",
        )),
        (Some(day), None, _) => Ok(MonthlyPattern::DayOfMonth(day_of_month(day)?)),
        (None, Some(week), Some(weekday)) => Ok(MonthlyPattern::OrdinalWeekday {
            week,
            weekday: DayOfWeek::try_from(weekday)?,
        }),
        (None, Some(_), None) => Err(invalid_rule(
            "week_of_month requires day_of_week_monthly",
            "يتطلب أسبوع الشهر تحديد يوم الأسبوع",
        )),
        (None, None, _) => Err(invalid_rule(
            "A monthly rule needs day_of_month or week_of_month",
            "تحتاج القاعدة الشهرية إلى يوم الشهر أو أسبوع الشهر",
        )),
    }
}

fn yearly_pattern(fields: &RuleFields) -> RecurrenceResult<Pattern> {
    let (Some(month), Some(day)) = (fields.month_of_year, fields.day_of_month) else {
        return Err(invalid_rule(
            "A yearly rule needs month_of_year and day_of_month",
            "تحتاج القاعدة السنوية إلى الشهر واليوم",
        ));
    };
    if !(1..=12).contains(&month) {
        return Err(invalid_rule(
            "month_of_year must be between 1 and 12",
            "يجب أن يكون الشهر بين 1 و12",
        ));
    }
    let day = day_of_month(day)?;
    // 2024 is a leap year, so Feb 29 passes and Feb 30 / Apr 31 do not.
    if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
        return Err(invalid_rule(
            "day_of_month does not exist in month_of_year",
            "اليوم المحدد غير موجود في الشهر المحدد",
        ));
    }
    Ok(Pattern::Yearly { month, day })
}

fn termination(fields: &RuleFields) -> RecurrenceResult<Termination> {
    match (fields.end_date, fields.occurrence_count) {
        (Some(_), Some(_)) => Err(invalid_rule(
            "Set either end_date or occurrence_count, not both",
            "حدد تاريخ الانتهاء أو عدد المرات، وليس كليهما",
        )),
        (Some(end), None) => Ok(Termination::EndDate(end)),
        (None, Some(count)) => NonZeroU32::new(count).map(Termination::Count).ok_or_else(|| {
            invalid_rule(
                "occurrence_count must be at least 1",
                "يجب أن يكون عدد المرات 1 على الأقل",
            )
        }),
        (None, None) => Ok(Termination::Open),
    }
}

impl TryFrom<RuleFields> for RecurrenceRule {
    type Error = RecurrenceError;

    fn try_from(fields: RuleFields) -> RecurrenceResult<Self> {
        let interval = NonZeroU32::new(fields.interval_count).ok_or_else(|| {
            invalid_rule(
                "interval_count must be at least 1",
                "يجب أن يكون فاصل التكرار 1 على الأقل",
            )
        })?;

        let pattern = match fields.frequency {
            Frequency::Daily => Pattern::Daily,
            Frequency::Weekly => Pattern::Weekly {
                days: fields
                    .days_of_week
                    .iter()
                    .map(|d| DayOfWeek::try_from(*d))
                    .collect::<RecurrenceResult<BTreeSet<_>>>()?,
            },
            Frequency::Monthly => Pattern::Monthly(monthly_pattern(&fields)?),
            Frequency::Yearly => yearly_pattern(&fields)?,
        };

        Ok(Self {
            pattern,
            interval,
            termination: termination(&fields)?,
        })
    }
}

impl From<RecurrenceRule> for RuleFields {
    fn from(rule: RecurrenceRule) -> Self {
        let mut fields = Self {
            frequency: rule.frequency(),
            interval_count: rule.interval.get(),
            days_of_week: Vec::new(),
            day_of_month: None,
            week_of_month: None,
            day_of_week_monthly: None,
            month_of_year: None,
            end_date: None,
            occurrence_count: None,
        };

        match rule.pattern {
            Pattern::Daily => {}
            Pattern::Weekly { days } => {
                fields.days_of_week = days.into_iter().map(u8::from).collect();
            }
            Pattern::Monthly(MonthlyPattern::DayOfMonth(day)) => fields.day_of_month = Some(day),
            Pattern::Monthly(MonthlyPattern::OrdinalWeekday { week, weekday }) => {
                fields.week_of_month = Some(week);
                fields.day_of_week_monthly = Some(weekday.index());
            }
            Pattern::Yearly { month, day } => {
                fields.month_of_year = Some(month);
                fields.day_of_month = Some(day);
            }
        }

        match rule.termination {
            Termination::EndDate(end) => fields.end_date = Some(end),
            Termination::Count(count) => fields.occurrence_count = Some(count.get()),
            Termination::Open => {}
        }

        fields
    }
}
