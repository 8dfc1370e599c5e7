use dossier_core::{Bilingual, bilingual};
use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    DatabaseError(#[from] dossier_db::error::DbError),

    #[error(transparent)]
    RecurrenceError(#[from] dossier_recurrence::RecurrenceError),

    #[error(transparent)]
    CoreError(#[from] dossier_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Not found: {0}")]
    NotFound(Bilingual),

    #[error("Validation error: {0}")]
    ValidationError(Bilingual),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl ServiceError {
    /// Client-facing message pair for this error.
    #[must_use]
    pub fn bilingual(&self) -> Bilingual {
        match self {
            Self::NotFound(msg) | Self::ValidationError(msg) => msg.clone(),
            Self::RecurrenceError(err) => err.bilingual(),
            Self::NotAuthenticated => bilingual!(
                "A valid bearer token is required",
                "يلزم رمز وصول صالح"
            ),
            Self::AuthorizationError(_) => bilingual!(
                "You do not have permission to perform this action",
                "ليست لديك صلاحية لتنفيذ هذا الإجراء"
            ),
            Self::DatabaseError(dossier_db::error::DbError::NotFound(_)) => bilingual!(
                "The requested record was not found",
                "السجل المطلوب غير موجود"
            ),
            Self::CasbinError(_)
            | Self::DatabaseError(_)
            | Self::CoreError(_)
            | Self::InvariantViolation(_) => bilingual!(
                "An unexpected error occurred",
                "حدث خطأ غير متوقع"
            ),
        }
    }
}

pub(crate) fn validation(en: &str, ar: &str) -> ServiceError {
    ServiceError::ValidationError(Bilingual::new(en, ar))
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
