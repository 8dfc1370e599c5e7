use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflicting write: {0}")]
    Conflict(String),

    #[error("Stored payload could not be decoded: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] dossier_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
