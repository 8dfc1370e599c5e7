//! Request and response bodies of the intake use cases.

use dossier_db::db::enums::{Priority, RequestType, Sensitivity, Urgency};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scorer::{ConfidenceLevel, DerivedPriority, FieldPrediction};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterTicketRequest {
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub request_type: Option<RequestType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub request_type: FieldPrediction<RequestType>,
    pub sensitivity: FieldPrediction<Sensitivity>,
    pub urgency: FieldPrediction<Urgency>,
    pub priority: DerivedPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub en: String,
    pub ar: String,
    pub matched_keywords: Vec<String>,
    pub similar_ticket_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub prediction_id: Uuid,
    pub ticket_id: Uuid,
    pub predictions: Predictions,
    pub overall_confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub explanation: Explanation,
    pub model_info: ModelInfo,
    pub cached: bool,
    pub processing_time_ms: u64,
}

/// Final values confirmed by a reviewer. Absent fields keep the predicted
/// value; an absent priority is derived again from the final urgency and
/// sensitivity.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct FinalValues {
    pub request_type: Option<RequestType>,
    pub sensitivity: Option<Sensitivity>,
    pub urgency: Option<Urgency>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub prediction_id: Uuid,
    #[serde(default)]
    pub final_values: FinalValues,
    #[serde(default)]
    pub feedback_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub feedback_id: Uuid,
    pub message: String,
    pub message_ar: String,
    pub used_for_training: bool,
}
