use dossier_core::config::{AuthConfig, Role};
use sha2::{Digest, Sha256};

use crate::error::{ServiceError, ServiceResult};

/// The caller a bearer token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

/// Lowercase hex SHA-256 of a raw token, the form tokens are configured in.
#[must_use]
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// ## Summary
/// Resolves an `Authorization` header value to a configured principal.
///
/// ## Errors
/// Returns `NotAuthenticated` if the header is missing, is not a bearer
/// token, or the token is not configured.
#[tracing::instrument(skip_all)]
pub fn authenticate_bearer(header: Option<&str>, auth: &AuthConfig) -> ServiceResult<Principal> {
    let Some(token) = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        tracing::debug!("Missing or malformed bearer token");
        return Err(ServiceError::NotAuthenticated);
    };

    let digest = token_digest(token);
    let Some(configured) = auth
        .tokens
        .iter()
        .find(|configured| configured.token_sha256.eq_ignore_ascii_case(&digest))
    else {
        tracing::debug!("Bearer token is not configured");
        return Err(ServiceError::NotAuthenticated);
    };

    tracing::trace!(subject = %configured.subject, role = %configured.role, "Bearer token accepted");
    Ok(Principal {
        subject: configured.subject.clone(),
        role: configured.role,
    })
}
