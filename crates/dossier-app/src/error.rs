use dossier_core::error::CoreError;
use dossier_core::{Bilingual, bilingual};
use dossier_db::error::DbError;
use dossier_recurrence::RecurrenceError;
use dossier_service::error::ServiceError;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// Body, query, or path parameter that does not match its schema.
    #[error("Bad request: {0}")]
    BadRequest(Bilingual),

    /// A collaborator the request depends on is not available.
    #[error("Service unavailable: {0}")]
    Unavailable(&'static str),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub message_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

fn internal() -> Bilingual {
    bilingual!("An unexpected error occurred", "حدث خطأ غير متوقع")
}

impl AppError {
    /// Wraps a failed body, query, or path parse as a 400.
    #[must_use]
    pub fn bad_request(detail: &impl std::fmt::Display) -> Self {
        Self::BadRequest(bilingual!(
            "Invalid request: {}",
            "طلب غير صالح: {}",
            detail
        ))
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError(err) | Self::ServiceError(ServiceError::DatabaseError(err)) => {
                db_status(err)
            }
            Self::ServiceError(err) => match err {
                ServiceError::ValidationError(_)
                | ServiceError::RecurrenceError(
                    RecurrenceError::InvalidRule(_)
                    | RecurrenceError::InvalidEdit(_)
                    | RecurrenceError::NotAnOccurrence { .. },
                ) => StatusCode::BAD_REQUEST,
                ServiceError::RecurrenceError(RecurrenceError::Export(_)) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                ServiceError::AuthorizationError(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::CasbinError(_)
                | ServiceError::CoreError(_)
                | ServiceError::DatabaseError(_)
                | ServiceError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(status: StatusCode) -> &'static str {
        match status {
            StatusCode::BAD_REQUEST => "validation_error",
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
            StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
            _ => "internal_error",
        }
    }

    fn message(&self, status: StatusCode) -> Bilingual {
        if status.is_server_error() {
            return match self {
                Self::Unavailable(_) => bilingual!(
                    "The service is temporarily unavailable",
                    "الخدمة غير متاحة مؤقتاً"
                ),
                _ => internal(),
            };
        }
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::DatabaseError(DbError::Conflict(_))
            | Self::ServiceError(ServiceError::DatabaseError(DbError::Conflict(_))) => bilingual!(
                "The record was changed by another request",
                "تم تعديل السجل بواسطة طلب آخر"
            ),
            Self::DatabaseError(DbError::NotFound(_)) => bilingual!(
                "The requested record was not found",
                "السجل المطلوب غير موجود"
            ),
            Self::ServiceError(err) => err.bilingual(),
            _ => internal(),
        }
    }

    /// ## Summary
    /// Render this error as a JSON error body with its status code.
    ///
    /// ## Side Effects
    /// Server errors are logged with a fresh correlation id, which is also
    /// returned to the caller.
    pub fn write_to(&self, res: &mut salvo::Response) {
        let status = self.status();
        let correlation_id = if status.is_server_error() {
            let id = Uuid::new_v4();
            tracing::error!(correlation_id = %id, error = ?self, "Request failed");
            Some(id)
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
            None
        };

        let Bilingual { en, ar } = self.message(status);
        res.status_code(status);
        res.render(Json(ErrorResponse {
            error: Self::code(status),
            message: en,
            message_ar: ar,
            correlation_id,
        }));
    }
}

fn db_status(err: &DbError) -> StatusCode {
    match err {
        DbError::NotFound(_) => StatusCode::NOT_FOUND,
        DbError::Conflict(_) => StatusCode::CONFLICT,
        DbError::Payload(_) | DbError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Write `result` as a JSON body: `status` on success, the error's own
/// status otherwise.
pub fn respond<T: Serialize + Send>(res: &mut salvo::Response, status: StatusCode, result: AppResult<T>) {
    match result {
        Ok(body) => {
            res.status_code(status);
            res.render(Json(body));
        }
        Err(err) => err.write_to(res),
    }
}
