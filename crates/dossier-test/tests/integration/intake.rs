#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Intake ticket and classification API integration tests.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

async fn register(app: &TestApp, body: &Value) -> String {
    let created = app
        .send(
            TestRequest::post("/intake-tickets")
                .bearer(EDITOR_TOKEN)
                .json_body(body),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    created["ticket"]["id"]
        .as_str()
        .expect("ticket id")
        .to_string()
}

async fn classify(app: &TestApp, ticket_id: &str) -> Value {
    app.send(TestRequest::get(&format!("/intake-classification/{ticket_id}")).bearer(VIEWER_TOKEN))
        .await
        .assert_status(StatusCode::OK)
        .json()
}

#[test_log::test(tokio::test)]
async fn register_and_fetch_ticket() {
    let app = TestApp::new().await;
    let id = register(
        &app,
        &json!({
            "title_en": "Prepare position on regional trade",
            "title_ar": "إعداد موقف بشأن التجارة الإقليمية",
            "request_type": "position"
        }),
    )
    .await;

    let body = app
        .send(TestRequest::get(&format!("/intake-tickets/{id}")).bearer(VIEWER_TOKEN))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["ticket"]["request_type"], "position");
    assert!(body["ticket"]["final_classification"].is_null());
}

#[test_log::test(tokio::test)]
async fn untitled_ticket_is_400() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::post("/intake-tickets")
            .bearer(EDITOR_TOKEN)
            .json_body(&json!({ "description_en": "No title at all" })),
    )
    .await
    .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[test_log::test(tokio::test)]
async fn classification_then_cache_hit() {
    let app = TestApp::new().await;
    let id = register(
        &app,
        &json!({ "title_en": "Urgent MoU signing with confidential annex" }),
    )
    .await;

    let first = classify(&app, &id).await;
    assert_eq!(first["cached"], false);
    assert_eq!(first["ticket_id"], id.as_str());
    assert_eq!(first["predictions"]["request_type"]["value"], "mou_action");
    assert_eq!(first["predictions"]["sensitivity"]["value"], "confidential");
    assert_eq!(first["predictions"]["urgency"]["value"], "high");
    assert_eq!(first["predictions"]["priority"]["value"], "urgent");
    assert_eq!(first["model_info"]["name"], "keyword-ensemble");
    assert!(first["explanation"]["en"].is_string());
    assert!(first["explanation"]["ar"].is_string());
    assert!(
        first["explanation"]["matched_keywords"]
            .as_array()
            .is_some_and(|keywords| !keywords.is_empty())
    );

    let confidence = first["overall_confidence"].as_f64().expect("confidence");
    assert!((0.0..=1.0).contains(&confidence));
    assert!(["high", "medium", "low"].contains(&first["confidence_level"].as_str().unwrap_or_default()));

    let second = classify(&app, &id).await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["prediction_id"], first["prediction_id"]);
}

#[test_log::test(tokio::test)]
async fn feedback_is_recorded_and_marks_training() {
    let app = TestApp::new().await;
    let id = register(&app, &json!({ "title_en": "Delegation visit planning for the summit" })).await;
    let prediction = classify(&app, &id).await;

    let body = app
        .send(
            TestRequest::post(&format!("/intake-classification/{id}/feedback"))
                .bearer(EDITOR_TOKEN)
                .json_body(&json!({
                    "prediction_id": prediction["prediction_id"],
                    "final_values": { "urgency": "critical" },
                    "feedback_notes": "Summit moved forward"
                })),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert!(body["feedback_id"].is_string());
    assert_eq!(body["used_for_training"], true);
    assert_eq!(body["message"], "Feedback recorded");
    assert_eq!(app.store.feedback_count().await, 1);

    let ticket = app
        .send(TestRequest::get(&format!("/intake-tickets/{id}")).bearer(VIEWER_TOKEN))
        .await
        .json();
    assert_eq!(ticket["ticket"]["final_classification"]["urgency"], "critical");
    assert_eq!(ticket["ticket"]["final_classification"]["priority"], "urgent");
}

#[test_log::test(tokio::test)]
async fn viewer_cannot_submit_feedback() {
    let app = TestApp::new().await;
    let id = register(&app, &json!({ "title_en": "Foresight scenario workshop" })).await;
    let prediction = classify(&app, &id).await;

    app.send(
        TestRequest::post(&format!("/intake-classification/{id}/feedback"))
            .bearer(VIEWER_TOKEN)
            .json_body(&json!({
                "prediction_id": prediction["prediction_id"],
                "final_values": {}
            })),
    )
    .await
    .assert_error(StatusCode::FORBIDDEN, "forbidden");
}

#[test_log::test(tokio::test)]
async fn classifying_unknown_ticket_is_404() {
    let app = TestApp::new().await;

    app.send(
        TestRequest::get("/intake-classification/0199a0a0-0000-7000-8000-000000000000")
            .bearer(VIEWER_TOKEN),
    )
    .await
    .assert_error(StatusCode::NOT_FOUND, "not_found");
}
