use dossier_core::Bilingual;
use thiserror::Error;

/// Errors raised by rule validation, generation, and scope resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The rule's fields do not describe a valid pattern.
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(Bilingual),

    /// The requested date is not one the series generates.
    #[error("{date} is not an occurrence of this series")]
    NotAnOccurrence { date: chrono::NaiveDate },

    /// An edit request that cannot be applied in the requested scope.
    #[error("Invalid edit: {0}")]
    InvalidEdit(Bilingual),

    #[error("RRULE export failed: {0}")]
    Export(String),
}

impl RecurrenceError {
    /// Message pair suitable for a client-facing error body.
    #[must_use]
    pub fn bilingual(&self) -> Bilingual {
        match self {
            Self::InvalidRule(msg) | Self::InvalidEdit(msg) => msg.clone(),
            Self::NotAnOccurrence { date } => dossier_core::bilingual!(
                "{} is not an occurrence of this series",
                "{} ليس موعداً ضمن هذه السلسلة",
                date
            ),
            Self::Export(detail) => dossier_core::bilingual!(
                "Could not export the recurrence rule: {}",
                "تعذر تصدير قاعدة التكرار: {}",
                detail
            ),
        }
    }
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;

pub(crate) fn invalid_rule(en: &str, ar: &str) -> RecurrenceError {
    RecurrenceError::InvalidRule(Bilingual::new(en, ar))
}
