#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Authentication, authorization, and CORS integration tests.
//!
//! ## Roles
//! - `viewer`: read series, classifications, and tickets
//! - `editor`: viewer plus write series, feedback, and tickets
//! - `admin`: everything an editor can do

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

fn weekly_series_body() -> serde_json::Value {
    json!({
        "entry_type": "meeting",
        "title_en": "Weekly sync",
        "start_datetime": "2025-09-02T09:00:00Z",
        "end_datetime": "2025-09-02T10:00:00Z",
        "recurrence": { "frequency": "weekly", "days_of_week": [2], "occurrence_count": 4 }
    })
}

#[test_log::test(tokio::test)]
async fn healthcheck_needs_no_token() {
    let app = TestApp::new().await;

    app.send(TestRequest::get("/healthcheck"))
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("OK");
}

#[test_log::test(tokio::test)]
async fn missing_token_is_401_with_bilingual_body() {
    let app = TestApp::new().await;

    let body = app
        .send(TestRequest::post("/recurring-events/create").json_body(&weekly_series_body()))
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "unauthorized");

    assert!(body.get("correlation_id").is_none());
}

#[test_log::test(tokio::test)]
async fn unknown_token_is_401() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::get("/intake-tickets/0199a0a0-0000-7000-8000-000000000000")
            .bearer("not-a-configured-token"),
    )
    .await
    .assert_error(StatusCode::UNAUTHORIZED, "unauthorized");
}

#[test_log::test(tokio::test)]
async fn viewer_cannot_write_series() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::post("/recurring-events/create")
            .bearer(VIEWER_TOKEN)
            .json_body(&weekly_series_body()),
    )
    .await
    .assert_error(StatusCode::FORBIDDEN, "forbidden");
}

#[test_log::test(tokio::test)]
async fn admin_inherits_editor_write() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::post("/recurring-events/create")
            .bearer(ADMIN_TOKEN)
            .json_body(&weekly_series_body()),
    )
    .await
    .assert_status(StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn viewer_can_read_what_editor_wrote() {
    let app = TestApp::new().await;

    let created = app
        .send(
            TestRequest::post("/recurring-events/create")
                .bearer(EDITOR_TOKEN)
                .json_body(&weekly_series_body()),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let id = created["series"]["id"].as_str().expect("series id");

    app.send(TestRequest::get(&format!("/recurring-events/series/{id}/occurrences")).bearer(VIEWER_TOKEN))
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn options_preflight_returns_cors_headers_only() {
    let app = TestApp::new().await;

    app.send(TestRequest::options("/recurring-events/create"))
        .await
        .assert_status(StatusCode::NO_CONTENT)
        .assert_header("access-control-allow-origin", "https://dossier.example")
        .assert_header_exists("access-control-allow-methods")
        .assert_header_exists("access-control-allow-headers")
        .assert_body_empty();
}

#[test_log::test(tokio::test)]
async fn options_on_unrouted_path_still_answers() {
    let app = TestApp::new().await;

    app.send(TestRequest::options("/no/such/route"))
        .await
        .assert_status(StatusCode::NO_CONTENT)
        .assert_header_exists("access-control-allow-origin");
}

#[test_log::test(tokio::test)]
async fn error_responses_carry_cors_headers() {
    let app = TestApp::new().await;

    app.send(TestRequest::get("/intake-tickets/not-a-uuid").bearer(VIEWER_TOKEN))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_header("access-control-allow-origin", "https://dossier.example");
}
