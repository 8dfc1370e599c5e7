use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::enums::{Priority, RequestType, Sensitivity, Urgency};

/// Final (or predicted) values for every classified field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClassification {
    pub request_type: RequestType,
    pub sensitivity: Sensitivity,
    pub urgency: Urgency,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeTicket {
    pub id: Uuid,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    /// Type the requester picked, if any.
    pub request_type: Option<RequestType>,
    /// Confirmed through feedback; makes the ticket a historical neighbour.
    pub final_classification: Option<TicketClassification>,
    pub created_at: DateTime<Utc>,
}

impl IntakeTicket {
    /// Titles and descriptions in both languages, space separated.
    #[must_use]
    pub fn combined_text(&self) -> String {
        [
            &self.title_en,
            &self.title_ar,
            &self.description_en,
            &self.description_ar,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Weighted keyword pattern. A match adds `weight` to every bucket it indicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPattern {
    pub id: Uuid,
    pub pattern_en: Option<String>,
    pub pattern_ar: Option<String>,
    pub weight: f64,
    pub indicates_type: Option<RequestType>,
    pub indicates_sensitivity: Option<Sensitivity>,
    pub indicates_urgency: Option<Urgency>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarTicket {
    pub ticket_id: Uuid,
    pub similarity: f64,
    pub classification: TicketClassification,
}

/// A computed classification kept for caching and feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPrediction {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub predicted: TicketClassification,
    /// Full response body as produced by the classifier.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationFeedback {
    pub id: Uuid,
    pub prediction_id: Uuid,
    pub ticket_id: Uuid,
    pub final_values: TicketClassification,
    pub feedback_notes: Option<String>,
    pub used_for_training: bool,
    pub created_at: DateTime<Utc>,
}
