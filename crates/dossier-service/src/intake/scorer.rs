//! Ensemble scoring of intake tickets.
//!
//! ## Summary
//! Keyword patterns, classified neighbours, and the requester's own choice of
//! type each add weight to per-field buckets. Buckets are normalized into
//! probability distributions; priority is looked up from urgency and
//! sensitivity rather than scored.

use std::collections::BTreeMap;

use dossier_core::util::text::{contains_normalized, normalize_for_matching};
use dossier_db::db::enums::{Label, Priority, RequestType, Sensitivity, Urgency};
use dossier_db::model::intake::{ClassificationPattern, SimilarTicket};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest confidence any single field can report.
const MAX_CONFIDENCE: f64 = 0.99;

/// Accumulated weight per value of one classified field.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores<T: Label> {
    buckets: BTreeMap<T, f64>,
}

impl<T: Label> Default for Scores<T> {
    fn default() -> Self {
        Self {
            buckets: T::ALL.iter().map(|value| (*value, 0.0)).collect(),
        }
    }
}

impl<T: Label> Scores<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: T, weight: f64) {
        *self.buckets.entry(value).or_insert(0.0) += weight;
    }

    /// Scores divided by their sum, or uniform when nothing scored.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn distribution(&self) -> BTreeMap<T, f64> {
        let total: f64 = self.buckets.values().sum();
        if total <= 0.0 {
            let uniform = 1.0 / T::ALL.len() as f64;
            return T::ALL.iter().map(|value| (*value, uniform)).collect();
        }
        self.buckets
            .iter()
            .map(|(value, score)| (*value, score / total))
            .collect()
    }

    #[must_use]
    pub fn predict(&self) -> FieldPrediction<T> {
        FieldPrediction::from_distribution(self.distribution())
    }
}

/// Prediction for one field: the most likely value and the full distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de> + Ord"))]
pub struct FieldPrediction<T> {
    pub value: T,
    pub confidence: f64,
    pub probabilities: BTreeMap<T, f64>,
}

impl<T: Label> FieldPrediction<T> {
    /// Picks the most probable value, ties going to the earlier variant.
    /// Confidence is the top probability plus half its margin over the
    /// runner-up, capped at 0.99.
    #[must_use]
    pub fn from_distribution(probabilities: BTreeMap<T, f64>) -> Self {
        let probability = |value: &T| probabilities.get(value).copied().unwrap_or(0.0);

        let mut best: Option<(T, f64)> = None;
        for value in T::ALL {
            let p = probability(value);
            if best.is_none_or(|(_, top)| p > top) {
                best = Some((*value, p));
            }
        }
        let (value, top) = best.unwrap_or((T::ALL[0], 0.0));
        let second = T::ALL
            .iter()
            .filter(|candidate| **candidate != value)
            .map(probability)
            .fold(0.0_f64, f64::max);

        Self {
            value,
            confidence: (top + 0.5 * (top - second)).min(MAX_CONFIDENCE),
            probabilities,
        }
    }
}

/// Priority derived from urgency and sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPriority {
    pub value: Priority,
    /// The lower of the two confidences it was derived from.
    pub confidence: f64,
}

/// Fixed priority table.
#[must_use]
pub fn derive_priority(urgency: Urgency, sensitivity: Sensitivity) -> Priority {
    let sensitive = sensitivity >= Sensitivity::Confidential;
    match urgency {
        Urgency::Critical => Priority::Urgent,
        Urgency::High if sensitive => Priority::Urgent,
        Urgency::High => Priority::High,
        Urgency::Medium if sensitivity == Sensitivity::Secret => Priority::High,
        Urgency::Medium => Priority::Medium,
        Urgency::Low if sensitive => Priority::Medium,
        Urgency::Low => Priority::Low,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Increments added for evidence other than keyword patterns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boosts {
    pub historical: f64,
    pub user_hint: f64,
}

/// Everything the scorer looks at for one ticket.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub text: &'a str,
    pub requested_type: Option<RequestType>,
    pub patterns: &'a [ClassificationPattern],
    pub similar: &'a [SimilarTicket],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub request_type: FieldPrediction<RequestType>,
    pub sensitivity: FieldPrediction<Sensitivity>,
    pub urgency: FieldPrediction<Urgency>,
    pub priority: DerivedPriority,
    /// Pattern text that matched, in pattern order.
    pub matched_keywords: Vec<String>,
    pub similar_ticket_ids: Vec<Uuid>,
}

impl Scored {
    /// Mean confidence of the three scored fields.
    #[must_use]
    pub fn overall_confidence(&self) -> f64 {
        (self.request_type.confidence + self.sensitivity.confidence + self.urgency.confidence) / 3.0
    }
}

fn matched_keyword(pattern: &ClassificationPattern, normalized: &str) -> Option<String> {
    [&pattern.pattern_en, &pattern.pattern_ar]
        .into_iter()
        .flatten()
        .find(|keyword| contains_normalized(normalized, keyword))
        .cloned()
}

/// ## Summary
/// Score a ticket's text against patterns and neighbours.
///
/// Inactive patterns are ignored. A pattern contributes its weight to every
/// field it indicates; each neighbour contributes `boosts.historical` to the
/// values it was classified with.
#[must_use]
pub fn score(input: &ScoringInput<'_>, boosts: Boosts) -> Scored {
    let normalized = normalize_for_matching(input.text);
    let mut types = Scores::<RequestType>::new();
    let mut sensitivities = Scores::<Sensitivity>::new();
    let mut urgencies = Scores::<Urgency>::new();
    let mut matched_keywords = Vec::new();

    for pattern in input.patterns.iter().filter(|p| p.is_active) {
        let Some(keyword) = matched_keyword(pattern, &normalized) else {
            continue;
        };
        if let Some(value) = pattern.indicates_type {
            types.add(value, pattern.weight);
        }
        if let Some(value) = pattern.indicates_sensitivity {
            sensitivities.add(value, pattern.weight);
        }
        if let Some(value) = pattern.indicates_urgency {
            urgencies.add(value, pattern.weight);
        }
        matched_keywords.push(keyword);
    }

    for neighbour in input.similar {
        let classification = neighbour.classification;
        types.add(classification.request_type, boosts.historical);
        sensitivities.add(classification.sensitivity, boosts.historical);
        urgencies.add(classification.urgency, boosts.historical);
    }

    if let Some(requested) = input.requested_type {
        types.add(requested, boosts.user_hint);
    }

    let request_type = types.predict();
    let sensitivity = sensitivities.predict();
    let urgency = urgencies.predict();
    let priority = DerivedPriority {
        value: derive_priority(urgency.value, sensitivity.value),
        confidence: urgency.confidence.min(sensitivity.confidence),
    };

    tracing::trace!(
        matched = matched_keywords.len(),
        neighbours = input.similar.len(),
        request_type = %request_type.value,
        urgency = %urgency.value,
        "Scored ticket"
    );

    Scored {
        request_type,
        sensitivity,
        urgency,
        priority,
        matched_keywords,
        similar_ticket_ids: input.similar.iter().map(|s| s.ticket_id).collect(),
    }
}
