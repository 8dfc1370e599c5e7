//! Intake ticket registration, classification, and feedback.
//!
//! ## Module Organization
//!
//! - `scorer`: pure ensemble scoring
//! - `patterns`: built-in keyword patterns
//! - `types`: request and response bodies

pub mod patterns;
pub mod scorer;
pub mod types;

use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use dossier_core::bilingual;
use dossier_core::config::IntakeConfig;
use dossier_db::db::IntakeRepository;
use dossier_db::error::DbError;
use dossier_db::model::intake::{
    ClassificationFeedback, IntakeTicket, StoredPrediction, TicketClassification,
};
use uuid::Uuid;

use self::scorer::{Boosts, ConfidenceLevel, Scored, ScoringInput, derive_priority, score};
use self::types::{
    ClassificationResponse, Explanation, FeedbackRequest, FeedbackResponse, ModelInfo,
    Predictions, RegisterTicketRequest,
};
use crate::error::{ServiceError, ServiceResult, validation};

const MODEL_NAME: &str = "keyword-ensemble";
const MODEL_VERSION: &str = "1.0";

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn ticket_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(bilingual!(
        "Ticket {} not found",
        "التذكرة {} غير موجودة",
        id
    ))
}

/// ## Summary
/// Register a new intake ticket.
///
/// ## Errors
/// Returns a validation error if neither title is present.
#[tracing::instrument(skip(repo, request))]
pub async fn register_ticket(
    repo: &dyn IntakeRepository,
    request: RegisterTicketRequest,
    now: DateTime<Utc>,
) -> ServiceResult<IntakeTicket> {
    let has_title = [&request.title_en, &request.title_ar]
        .into_iter()
        .flatten()
        .any(|title| !title.trim().is_empty());
    if !has_title {
        return Err(validation(
            "At least one of title_en or title_ar is required",
            "يجب إدخال العنوان بالإنجليزية أو بالعربية على الأقل",
        ));
    }

    let ticket = IntakeTicket {
        id: Uuid::now_v7(),
        title_en: request.title_en,
        title_ar: request.title_ar,
        description_en: request.description_en,
        description_ar: request.description_ar,
        request_type: request.request_type,
        final_classification: None,
        created_at: now,
    };
    repo.insert_ticket(ticket.clone()).await?;
    tracing::info!(ticket_id = %ticket.id, "Registered intake ticket");
    Ok(ticket)
}

/// ## Errors
/// Returns `NotFound` if no ticket has this id.
#[tracing::instrument(skip(repo))]
pub async fn get_ticket(repo: &dyn IntakeRepository, ticket_id: Uuid) -> ServiceResult<IntakeTicket> {
    repo.get_ticket(ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))
}

fn explanation(scored: &Scored) -> Explanation {
    let keywords = scored.matched_keywords.len();
    let neighbours = scored.similar_ticket_ids.len();
    let en = format!(
        "Matched {keywords} keyword pattern(s) and {neighbours} similar ticket(s). \
         Predicted {} request, {} urgency, {} sensitivity.",
        scored.request_type.value, scored.urgency.value, scored.sensitivity.value
    );
    let ar = format!(
        "تمت مطابقة {keywords} من أنماط الكلمات المفتاحية و{neighbours} من التذاكر المشابهة. \
         النوع المتوقع: {}، الاستعجال: {}، الحساسية: {}.",
        scored.request_type.value, scored.urgency.value, scored.sensitivity.value
    );
    Explanation {
        en,
        ar,
        matched_keywords: scored.matched_keywords.clone(),
        similar_ticket_ids: scored.similar_ticket_ids.clone(),
    }
}

fn model_info() -> ModelInfo {
    ModelInfo {
        name: MODEL_NAME.to_string(),
        version: MODEL_VERSION.to_string(),
        components: ["keyword_patterns", "historical_similarity", "user_hint"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

/// ## Summary
/// Classify a ticket, reusing a prediction younger than the cache TTL.
///
/// `now` is the reference time the cache age is measured against.
///
/// ## Side Effects
/// Stores every freshly computed prediction.
///
/// ## Errors
/// Returns `NotFound` for an unknown ticket, or a database error if a cached
/// prediction cannot be decoded.
#[tracing::instrument(skip(repo, config))]
pub async fn classify_ticket(
    repo: &dyn IntakeRepository,
    config: &IntakeConfig,
    ticket_id: Uuid,
    now: DateTime<Utc>,
) -> ServiceResult<ClassificationResponse> {
    let started = Instant::now();
    let ticket = get_ticket(repo, ticket_id).await?;

    let ttl = TimeDelta::seconds(config.cache_ttl_seconds);
    if let Some(stored) = repo.latest_prediction(ticket_id).await?
        && now - stored.created_at < ttl
    {
        let mut response: ClassificationResponse =
            serde_json::from_value(stored.payload).map_err(DbError::from)?;
        response.cached = true;
        response.processing_time_ms = elapsed_ms(started);
        tracing::debug!(prediction_id = %response.prediction_id, "Serving cached classification");
        return Ok(response);
    }

    let text = ticket.combined_text();
    let patterns = repo.active_patterns().await?;
    let similar = repo
        .find_similar(
            ticket_id,
            &text,
            config.similarity_threshold,
            config.max_similar_tickets,
        )
        .await?;

    let scored = score(
        &ScoringInput {
            text: &text,
            requested_type: ticket.request_type,
            patterns: &patterns,
            similar: &similar,
        },
        Boosts {
            historical: config.historical_boost,
            user_hint: config.user_hint_boost,
        },
    );
    let overall_confidence = scored.overall_confidence();
    let predicted = TicketClassification {
        request_type: scored.request_type.value,
        sensitivity: scored.sensitivity.value,
        urgency: scored.urgency.value,
        priority: scored.priority.value,
    };

    let response = ClassificationResponse {
        prediction_id: Uuid::now_v7(),
        ticket_id,
        explanation: explanation(&scored),
        predictions: Predictions {
            request_type: scored.request_type,
            sensitivity: scored.sensitivity,
            urgency: scored.urgency,
            priority: scored.priority,
        },
        overall_confidence,
        confidence_level: ConfidenceLevel::from_confidence(overall_confidence),
        model_info: model_info(),
        cached: false,
        processing_time_ms: elapsed_ms(started),
    };

    repo.insert_prediction(StoredPrediction {
        id: response.prediction_id,
        ticket_id,
        predicted,
        payload: serde_json::to_value(&response).map_err(DbError::from)?,
        created_at: now,
    })
    .await?;

    tracing::info!(
        prediction_id = %response.prediction_id,
        overall_confidence,
        "Classified intake ticket"
    );
    Ok(response)
}

/// ## Summary
/// Record a reviewer's final values for a prediction.
///
/// ## Side Effects
/// Stores the feedback and the final classification on the ticket, which
/// makes it a historical neighbour for later classifications.
///
/// ## Errors
/// - `NotFound` for an unknown ticket or prediction.
/// - A validation error if the prediction belongs to another ticket.
#[tracing::instrument(skip(repo, request), fields(prediction_id = %request.prediction_id))]
pub async fn submit_feedback(
    repo: &dyn IntakeRepository,
    ticket_id: Uuid,
    request: FeedbackRequest,
    now: DateTime<Utc>,
) -> ServiceResult<FeedbackResponse> {
    get_ticket(repo, ticket_id).await?;
    let prediction = repo
        .get_prediction(request.prediction_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(bilingual!(
                "Prediction {} not found",
                "التنبؤ {} غير موجود",
                request.prediction_id
            ))
        })?;
    if prediction.ticket_id != ticket_id {
        return Err(validation(
            "The prediction does not belong to this ticket",
            "التنبؤ لا يخص هذه التذكرة",
        ));
    }

    let predicted = prediction.predicted;
    let values = request.final_values;
    let sensitivity = values.sensitivity.unwrap_or(predicted.sensitivity);
    let urgency = values.urgency.unwrap_or(predicted.urgency);
    let final_values = TicketClassification {
        request_type: values.request_type.unwrap_or(predicted.request_type),
        sensitivity,
        urgency,
        priority: values
            .priority
            .unwrap_or_else(|| derive_priority(urgency, sensitivity)),
    };
    let used_for_training = final_values != predicted;

    let feedback = ClassificationFeedback {
        id: Uuid::now_v7(),
        prediction_id: prediction.id,
        ticket_id,
        final_values,
        feedback_notes: request.feedback_notes,
        used_for_training,
        created_at: now,
    };
    let feedback_id = feedback.id;
    repo.record_feedback(feedback).await?;

    tracing::info!(%feedback_id, used_for_training, "Recorded classification feedback");

    let message = bilingual!(
        "Feedback recorded",
        "تم تسجيل الملاحظات"
    );
    Ok(FeedbackResponse {
        feedback_id,
        message: message.en,
        message_ar: message.ar,
        used_for_training,
    })
}
