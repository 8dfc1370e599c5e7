use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::{
    OccurrenceGenerator, RecurrenceRule, RuleFields, SeriesStart, expand_rrule_text, to_rrule_text,
};

/// A rule both engines express identically, with the dates it must produce.
pub struct RRuleCase {
    pub name: &'static str,
    pub rule: serde_json::Value,
    pub anchor: &'static str,
    pub series_end: Option<&'static str>,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: u16,
}

#[expect(clippy::too_many_lines)]
pub fn rrule_cases() -> Vec<RRuleCase> {
    vec![
        RRuleCase {
            name: "daily_basic",
            rule: serde_json::json!({ "frequency": "daily", "occurrence_count": 3 }),
            anchor: "2012-02-01",
            series_end: None,
            expected: Some(&["2012-02-01", "2012-02-02", "2012-02-03"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "daily_interval_until",
            rule: serde_json::json!({
                "frequency": "daily",
                "interval_count": 10,
                "end_date": "2012-03-01"
            }),
            anchor: "2012-01-01",
            series_end: None,
            expected: Some(&[
                "2012-01-01",
                "2012-01-11",
                "2012-01-21",
                "2012-01-31",
                "2012-02-10",
                "2012-02-20",
                "2012-03-01",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "weekly_tue_thu",
            rule: serde_json::json!({
                "frequency": "weekly",
                "days_of_week": [2, 4],
                "occurrence_count": 3
            }),
            anchor: "1997-09-02",
            series_end: None,
            expected: Some(&["1997-09-02", "1997-09-04", "1997-09-09"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "weekly_mon_wed_fri_from_wednesday",
            rule: serde_json::json!({
                "frequency": "weekly",
                "days_of_week": [1, 3, 5],
                "occurrence_count": 5
            }),
            anchor: "2025-09-17",
            series_end: None,
            expected: Some(&[
                "2025-09-17",
                "2025-09-19",
                "2025-09-22",
                "2025-09-24",
                "2025-09-26",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "biweekly_sunday_and_saturday",
            rule: serde_json::json!({
                "frequency": "weekly",
                "interval_count": 2,
                "days_of_week": [0, 6],
                "occurrence_count": 6
            }),
            anchor: "2025-03-02",
            series_end: None,
            expected: Some(&[
                "2025-03-02",
                "2025-03-08",
                "2025-03-16",
                "2025-03-22",
                "2025-03-30",
                "2025-04-05",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "monthly_day_31_skips_short_months",
            rule: serde_json::json!({
                "frequency": "monthly",
                "day_of_month": 31,
                "occurrence_count": 4
            }),
            anchor: "2025-01-31",
            series_end: None,
            expected: Some(&["2025-01-31", "2025-03-31", "2025-05-31", "2025-07-31"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "monthly_third_tuesday",
            rule: serde_json::json!({
                "frequency": "monthly",
                "week_of_month": "third",
                "day_of_week_monthly": 2,
                "end_date": "2025-12-31"
            }),
            anchor: "2025-09-16",
            series_end: None,
            expected: Some(&["2025-09-16", "2025-10-21", "2025-11-18", "2025-12-16"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "quarterly_last_friday",
            rule: serde_json::json!({
                "frequency": "monthly",
                "interval_count": 3,
                "week_of_month": "last",
                "day_of_week_monthly": 5,
                "occurrence_count": 4
            }),
            anchor: "2025-01-31",
            series_end: None,
            expected: Some(&["2025-01-31", "2025-04-25", "2025-07-25", "2025-10-31"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_count_three",
            rule: serde_json::json!({
                "frequency": "yearly",
                "month_of_year": 9,
                "day_of_month": 15,
                "occurrence_count": 3
            }),
            anchor: "2025-09-15",
            series_end: None,
            expected: Some(&["2025-09-15", "2026-09-15", "2027-09-15"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_leap_day",
            rule: serde_json::json!({
                "frequency": "yearly",
                "month_of_year": 2,
                "day_of_month": 29,
                "occurrence_count": 3
            }),
            anchor: "2024-02-29",
            series_end: None,
            expected: Some(&["2024-02-29", "2028-02-29", "2032-02-29"]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "open_weekly_with_series_end",
            rule: serde_json::json!({ "frequency": "weekly", "days_of_week": [1] }),
            anchor: "2025-01-06",
            series_end: Some("2025-12-31"),
            expected: None,
            expected_len: Some(52),
            limit: 200,
        },
        RRuleCase {
            name: "count_narrowed_by_series_end",
            rule: serde_json::json!({ "frequency": "daily", "occurrence_count": 30 }),
            anchor: "2025-06-01",
            series_end: Some("2025-06-10"),
            expected: None,
            expected_len: Some(10),
            limit: 100,
        },
    ]
}

fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .unwrap_or_else(|err| panic!("Failed to parse date {value}: {err}"))
}

pub fn assert_case(case: &RRuleCase) {
    let anchor = parse_date(case.anchor);
    let series_end = case.series_end.map(parse_date);
    let fields: RuleFields = serde_json::from_value(case.rule.clone())
        .unwrap_or_else(|err| panic!("Failed to read rule for {}: {}", case.name, err));
    let rule = RecurrenceRule::try_from(fields.with_anchor_defaults(anchor))
        .unwrap_or_else(|err| panic!("Invalid rule for {}: {}", case.name, err));

    let far = parse_date("2100-01-01");
    let ours = OccurrenceGenerator::new(&rule, anchor)
        .with_series_end(series_end)
        .generate(anchor, far, usize::from(case.limit));

    let start = SeriesStart {
        date: anchor,
        time: NaiveTime::MIN,
        tz: Tz::UTC,
    };
    let text = to_rrule_text(&rule, start, series_end)
        .unwrap_or_else(|err| panic!("Failed to export {}: {}", case.name, err));
    let theirs = expand_rrule_text(&text, case.limit)
        .unwrap_or_else(|err| panic!("Failed to expand {}: {}", case.name, err));

    assert_eq!(ours, theirs, "Case {} disagrees with rrule for {text}", case.name);

    if let Some(expected) = case.expected {
        let expected: Vec<NaiveDate> = expected.iter().map(|value| parse_date(value)).collect();
        assert_eq!(ours, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            ours.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}
