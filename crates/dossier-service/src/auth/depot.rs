//! Depot helpers for reading the authenticated principal.

use super::Principal;
use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const AUTHENTICATED_PRINCIPAL: &str = "__authenticated_principal";
}

/// Get the authenticated principal from the depot.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if the auth middleware did not store a principal.
pub fn get_principal_from_depot(depot: &salvo::Depot) -> ServiceResult<&Principal> {
    depot
        .get::<Principal>(depot_keys::AUTHENTICATED_PRINCIPAL)
        .map_err(|_e| ServiceError::NotAuthenticated)
}
