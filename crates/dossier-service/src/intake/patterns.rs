//! Keyword patterns a fresh store is seeded with.

use dossier_db::db::enums::{RequestType, Sensitivity, Urgency};
use dossier_db::model::intake::ClassificationPattern;
use uuid::Uuid;

struct Seed {
    en: &'static str,
    ar: &'static str,
    weight: f64,
    request_type: Option<RequestType>,
    sensitivity: Option<Sensitivity>,
    urgency: Option<Urgency>,
}

const fn seed(en: &'static str, ar: &'static str, weight: f64) -> Seed {
    Seed {
        en,
        ar,
        weight,
        request_type: None,
        sensitivity: None,
        urgency: None,
    }
}

const fn typed(mut s: Seed, request_type: RequestType) -> Seed {
    s.request_type = Some(request_type);
    s
}

const fn sensitive(mut s: Seed, sensitivity: Sensitivity) -> Seed {
    s.sensitivity = Some(sensitivity);
    s
}

const fn urgent(mut s: Seed, urgency: Urgency) -> Seed {
    s.urgency = Some(urgency);
    s
}

const SEEDS: &[Seed] = &[
    typed(seed("mou", "مذكرة تفاهم", 1.5), RequestType::MouAction),
    typed(seed("memorandum", "مذكرة", 1.2), RequestType::MouAction),
    typed(seed("agreement", "اتفاقية", 1.0), RequestType::MouAction),
    typed(seed("visit", "زيارة", 1.0), RequestType::Engagement),
    typed(seed("meeting", "اجتماع", 0.8), RequestType::Engagement),
    typed(seed("delegation", "وفد", 1.0), RequestType::Engagement),
    typed(seed("position paper", "ورقة موقف", 1.5), RequestType::Position),
    typed(seed("talking points", "نقاط حديث", 1.2), RequestType::Position),
    typed(seed("stance", "موقف", 0.8), RequestType::Position),
    typed(seed("foresight", "استشراف", 1.5), RequestType::Foresight),
    typed(seed("scenario", "سيناريو", 1.0), RequestType::Foresight),
    typed(seed("outlook", "توقعات", 0.8), RequestType::Foresight),
    sensitive(seed("secret", "سري للغاية", 2.0), Sensitivity::Secret),
    sensitive(seed("confidential", "سري", 1.5), Sensitivity::Confidential),
    sensitive(seed("internal", "داخلي", 1.0), Sensitivity::Internal),
    sensitive(seed("public", "عام", 0.8), Sensitivity::Public),
    sensitive(seed("press release", "بيان صحفي", 1.0), Sensitivity::Public),
    urgent(seed("immediately", "فورا", 2.0), Urgency::Critical),
    urgent(seed("emergency", "طارئ", 2.0), Urgency::Critical),
    urgent(seed("urgent", "عاجل", 1.5), Urgency::High),
    urgent(seed("asap", "في أقرب وقت", 1.5), Urgency::High),
    urgent(seed("this week", "هذا الأسبوع", 1.0), Urgency::Medium),
    urgent(seed("when possible", "عند الإمكان", 1.0), Urgency::Low),
    urgent(sensitive(seed("minister", "الوزير", 0.6), Sensitivity::Confidential), Urgency::High),
];

/// Base of the fixed ids given to built-in patterns.
const BUILTIN_ID_BASE: u128 = 0x0190_0000_0000_7000_8000_0000_0000_0000;

/// The built-in bilingual keyword patterns, all active.
#[must_use]
pub fn builtin_patterns() -> Vec<ClassificationPattern> {
    SEEDS
        .iter()
        .zip(0_u128..)
        .map(|(seed, index)| ClassificationPattern {
            id: Uuid::from_u128(BUILTIN_ID_BASE + index),
            pattern_en: Some(seed.en.to_string()),
            pattern_ar: Some(seed.ar.to_string()),
            weight: seed.weight,
            indicates_type: seed.request_type,
            indicates_sensitivity: seed.sensitivity,
            indicates_urgency: seed.urgency,
            is_active: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_ids_are_stable_and_unique() {
        let patterns = builtin_patterns();
        let ids: HashSet<Uuid> = patterns.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), patterns.len());
        assert_eq!(builtin_patterns()[0].id, patterns[0].id);
    }

    #[test]
    fn every_pattern_indicates_something() {
        for pattern in builtin_patterns() {
            assert!(
                pattern.indicates_type.is_some()
                    || pattern.indicates_sensitivity.is_some()
                    || pattern.indicates_urgency.is_some(),
                "{:?} indicates nothing",
                pattern.pattern_en
            );
            assert!(pattern.weight > 0.0);
        }
    }
}
