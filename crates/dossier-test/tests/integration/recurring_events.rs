#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Recurring-events API integration tests.
//!
//! All series here are anchored in 2025 and bounded, so results do not
//! depend on the wall clock.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

/// Weekly on Tuesday from 2025-09-02, ten occurrences:
/// 09-02, 09-09, 09-16, 09-23, 09-30, 10-07, 10-14, 10-21, 10-28, 11-04.
async fn create_weekly(app: &TestApp) -> String {
    let body = app
        .send(
            TestRequest::post("/recurring-events/create")
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "entry_type": "meeting",
                    "title_en": "Steering committee",
                    "title_ar": "اللجنة التوجيهية",
                    "location": "Room 4",
                    "start_datetime": "2025-09-02T09:00:00Z",
                    "end_datetime": "2025-09-02T10:30:00Z",
                    "recurrence": {
                        "frequency": "weekly",
                        "interval_count": 1,
                        "days_of_week": [2],
                        "occurrence_count": 10
                    }
                })),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body["generated_occurrences"], 10);
    assert_eq!(body["master_event"]["title_en"], "Steering committee");
    body["series"]["id"]
        .as_str()
        .expect("series id")
        .to_string()
}

async fn list(app: &TestApp, id: &str, query: &str) -> Value {
    app.send(
        TestRequest::get(&format!("/recurring-events/series/{id}/occurrences?{query}"))
            .bearer(VIEWER_TOKEN),
    )
    .await
    .assert_status(StatusCode::OK)
    .json()
}

fn dates(listing: &Value) -> Vec<String> {
    listing["occurrences"]
        .as_array()
        .expect("occurrences array")
        .iter()
        .map(|o| o["occurrence_date"].as_str().expect("date").to_string())
        .collect()
}

#[test_log::test(tokio::test)]
async fn create_then_list_window() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let listing = list(&app, &id, "start_date=2025-09-01&end_date=2025-12-31").await;
    assert_eq!(listing["total_count"], 10);
    assert_eq!(listing["recurrence_rule"]["frequency"], "weekly");
    assert_eq!(dates(&listing).first().map(String::as_str), Some("2025-09-02"));
    assert_eq!(dates(&listing).last().map(String::as_str), Some("2025-11-04"));

    let first = &listing["occurrences"][0];
    assert_eq!(first["status"], "scheduled");
    assert_eq!(first["start_datetime"], "2025-09-02T09:00:00Z");
    assert_eq!(first["end_datetime"], "2025-09-02T10:30:00Z");

    let narrow = list(&app, &id, "start_date=2025-09-10&end_date=2025-09-30").await;
    assert_eq!(
        dates(&narrow),
        vec!["2025-09-16", "2025-09-23", "2025-09-30"]
    );
}

#[test_log::test(tokio::test)]
async fn limit_truncates_but_total_counts_window() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let listing = list(&app, &id, "start_date=2025-09-01&end_date=2025-12-31&limit=3").await;
    assert_eq!(listing["total_count"], 10);
    assert_eq!(dates(&listing).len(), 3);
}

#[test_log::test(tokio::test)]
async fn cancelled_exception_hidden_from_active_view() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let exception = app
        .send(
            TestRequest::post(&format!("/recurring-events/series/{id}/exceptions"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "exception_date": "2025-09-16",
                    "exception_type": "cancelled",
                    "reason_en": "Public holiday"
                })),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(exception["exception_date"], "2025-09-16");
    assert_eq!(exception["series_id"], id.as_str());

    let full = list(&app, &id, "start_date=2025-09-01&end_date=2025-12-31").await;
    assert_eq!(full["total_count"], 10);
    assert_eq!(full["occurrences"][2]["status"], "cancelled");
    assert_eq!(full["exceptions"].as_array().map(Vec::len), Some(1));

    let active = list(
        &app,
        &id,
        "start_date=2025-09-01&end_date=2025-12-31&include_cancelled=false",
    )
    .await;
    assert_eq!(active["total_count"], 9);
    assert!(!dates(&active).contains(&"2025-09-16".to_string()));

    app.send(
        TestRequest::delete(&format!("/recurring-events/series/{id}/exceptions/2025-09-16"))
            .bearer(EDITOR_TOKEN),
    )
    .await
    .assert_status(StatusCode::OK)
    .assert_body_contains("\"success\":true");

    let restored = list(&app, &id, "start_date=2025-09-16&end_date=2025-09-16").await;
    assert_eq!(restored["occurrences"][0]["status"], "scheduled");
}

#[test_log::test(tokio::test)]
async fn rescheduled_exception_uses_replacement_times() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let exception = app
        .send(
            TestRequest::post(&format!("/recurring-events/series/{id}/exceptions"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "exception_date": "2025-09-23",
                    "exception_type": "rescheduled",
                    "replacement_event": {
                        "start_datetime": "2025-09-24T13:00:00Z",
                        "end_datetime": "2025-09-24T14:00:00Z"
                    }
                })),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert!(exception["replacement_entry_id"].is_string());

    let listing = list(&app, &id, "start_date=2025-09-23&end_date=2025-09-23").await;
    let occurrence = &listing["occurrences"][0];
    assert_eq!(occurrence["occurrence_date"], "2025-09-23");
    assert_eq!(occurrence["status"], "modified");
    assert_eq!(occurrence["exception_type"], "rescheduled");
    assert_eq!(occurrence["start_datetime"], "2025-09-24T13:00:00Z");
    assert_eq!(occurrence["title_en"], "Steering committee");
}

#[test_log::test(tokio::test)]
async fn exception_on_non_occurrence_is_400() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    app.send(
        TestRequest::post(&format!("/recurring-events/series/{id}/exceptions"))
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({
                "exception_date": "2025-09-17",
                "exception_type": "cancelled"
            })),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[test_log::test(tokio::test)]
async fn removing_missing_exception_is_404() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    app.send(
        TestRequest::delete(&format!("/recurring-events/series/{id}/exceptions/2025-09-09"))
            .bearer(EDITOR_TOKEN),
    )
    .await
    .assert_error(StatusCode::NOT_FOUND, "not_found");
}

#[test_log::test(tokio::test)]
async fn single_update_touches_one_occurrence() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let body = app
        .send(
            TestRequest::put(&format!("/recurring-events/series/{id}/update"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "edit_options": { "scope": "single", "occurrence_date": "2025-09-09" },
                    "updates": { "title_en": "Steering committee (extended)" }
                })),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["updated_count"], 1);
    assert!(body["new_series_id"].is_null());

    let listing = list(&app, &id, "start_date=2025-09-01&end_date=2025-09-16").await;
    let titles: Vec<&str> = listing["occurrences"]
        .as_array()
        .expect("occurrences")
        .iter()
        .map(|o| o["title_en"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Steering committee",
            "Steering committee (extended)",
            "Steering committee"
        ]
    );
}

#[test_log::test(tokio::test)]
async fn this_and_future_update_splits_series() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let body = app
        .send(
            TestRequest::put(&format!("/recurring-events/series/{id}/update"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "edit_options": { "scope": "this_and_future", "occurrence_date": "2025-10-07" },
                    "updates": { "location": "Room 9" }
                })),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();
    let successor = body["new_series_id"].as_str().expect("split creates a series");
    assert_ne!(successor, id);

    let original = list(&app, &id, "start_date=2025-09-01&end_date=2025-12-31").await;
    assert_eq!(original["total_count"], 5);
    assert_eq!(dates(&original).last().map(String::as_str), Some("2025-09-30"));

    let split = list(&app, successor, "start_date=2025-09-01&end_date=2025-12-31").await;
    assert_eq!(split["series"]["parent_series_id"], id.as_str());
    assert_eq!(dates(&split).first().map(String::as_str), Some("2025-10-07"));
    assert_eq!(split["total_count"], 5);
    assert_eq!(split["occurrences"][0]["location"], "Room 9");
}

#[test_log::test(tokio::test)]
async fn concurrent_splits_leave_each_date_in_one_series() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;
    let path = format!("/recurring-events/series/{id}/update");
    let split = |day: &str, location: &str| {
        TestRequest::put(&path).bearer(EDITOR_TOKEN).json_body(&json!({
            "edit_options": { "scope": "this_and_future", "occurrence_date": day },
            "updates": { "location": location }
        }))
    };

    let (a, b) = tokio::join!(
        app.send(split("2025-09-16", "Room 7")),
        app.send(split("2025-10-07", "Room 8"))
    );

    // A split planned on a series another split already changed is refused
    // (409), or its date is no longer in the series (400).
    let mut series_ids = vec![id.clone()];
    for response in [&a, &b] {
        match response.status {
            StatusCode::OK => series_ids.push(
                response.json()["new_series_id"]
                    .as_str()
                    .expect("split creates a series")
                    .to_string(),
            ),
            StatusCode::CONFLICT | StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}: {}", response.body_string()),
        }
    }
    assert!(series_ids.len() > 1, "at least one split applies");

    let mut all = Vec::new();
    for series_id in &series_ids {
        all.extend(dates(&list(&app, series_id, "start_date=2025-09-01&end_date=2025-12-31").await));
    }
    all.sort();
    let mut distinct = all.clone();
    distinct.dedup();
    assert_eq!(all.len(), 10);
    assert_eq!(distinct, all);
}

#[test_log::test(tokio::test)]
async fn this_and_future_delete_truncates_series() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    app.send(
        TestRequest::post(&format!("/recurring-events/series/{id}/exceptions"))
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({
                "exception_date": "2025-10-21",
                "exception_type": "cancelled"
            })),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let body = app
        .send(
            TestRequest::delete(&format!("/recurring-events/series/{id}/delete"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "edit_options": { "scope": "this_and_future", "occurrence_date": "2025-10-14" }
                })),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["deleted_count"], 4);

    let listing = list(&app, &id, "start_date=2025-09-01&end_date=2025-12-31").await;
    assert_eq!(listing["total_count"], 6);
    assert_eq!(dates(&listing).last().map(String::as_str), Some("2025-10-07"));
    assert_eq!(listing["series"]["series_end_date"], "2025-10-13");
    assert_eq!(listing["exceptions"].as_array().map(Vec::len), Some(0));
}

#[test_log::test(tokio::test)]
async fn window_wider_than_maximum_is_400() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    app.send(
        TestRequest::get(&format!(
            "/recurring-events/series/{id}/occurrences?start_date=2025-09-01&end_date=9999-12-31&limit=1"
        ))
        .bearer(VIEWER_TOKEN),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[test_log::test(tokio::test)]
async fn update_requires_occurrence_date_for_single() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    app.send(
        TestRequest::put(&format!("/recurring-events/series/{id}/update"))
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({
                "edit_options": { "scope": "single" },
                "updates": { "title_en": "No date" }
            })),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[test_log::test(tokio::test)]
async fn delete_single_then_all() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let single = app
        .send(
            TestRequest::delete(&format!("/recurring-events/series/{id}/delete"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "edit_options": { "scope": "single", "occurrence_date": "2025-09-30" },
                    "reason_en": "Venue closed"
                })),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(single["deleted_count"], 1);

    let listing = list(&app, &id, "start_date=2025-09-30&end_date=2025-09-30").await;
    assert_eq!(listing["occurrences"][0]["status"], "cancelled");
    assert_eq!(listing["exceptions"][0]["reason_en"], "Venue closed");

    app.send(
        TestRequest::delete(&format!("/recurring-events/series/{id}/delete"))
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({ "edit_options": { "scope": "all" } })),
    )
    .await
    .assert_status(StatusCode::OK);

    app.send(
        TestRequest::get(&format!("/recurring-events/series/{id}/occurrences")).bearer(VIEWER_TOKEN),
    )
    .await
    .assert_error(StatusCode::NOT_FOUND, "not_found");
}

#[test_log::test(tokio::test)]
async fn rrule_export_round_trips() {
    let app = TestApp::new().await;
    let id = create_weekly(&app).await;

    let body = app
        .send(TestRequest::get(&format!("/recurring-events/series/{id}/rrule")).bearer(VIEWER_TOKEN))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(
        body["rrule"],
        "DTSTART:20250902T090000Z\nRRULE:FREQ=WEEKLY;INTERVAL=1;WKST=SU;BYDAY=TU;COUNT=10"
    );
    let dates = dossier_test::recurrence::expand_rrule_text(
        body["rrule"].as_str().expect("rrule text"),
        20,
    )
    .expect("exported text parses");
    assert_eq!(dates.len(), 10);
}

#[test_log::test(tokio::test)]
async fn invalid_rule_is_400() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::post("/recurring-events/create")
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({
                "entry_type": "meeting",
                "title_en": "Broken",
                "start_datetime": "2025-09-02T09:00:00Z",
                "recurrence": { "frequency": "monthly", "day_of_month": 32 }
            })),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[test_log::test(tokio::test)]
async fn malformed_body_and_unknown_series() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::post("/recurring-events/create")
            .bearer(EDITOR_TOKEN)
            .content_type("application/json")
            .body("{not json"),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");

    app.send(
        TestRequest::get("/recurring-events/series/0199a0a0-0000-7000-8000-000000000000/occurrences")
            .bearer(VIEWER_TOKEN),
    )
    .await
    .assert_error(StatusCode::NOT_FOUND, "not_found");
}
