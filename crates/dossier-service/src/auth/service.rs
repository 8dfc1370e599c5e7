//! Role checks against the Casbin enforcer.

use std::sync::Arc;

use casbin::CoreApi;

use super::{Action, Principal, Resource};
use crate::error::{ServiceError, ServiceResult};

/// Authorization service for checking permissions.
pub struct Authorizer {
    enforcer: Arc<casbin::Enforcer>,
}

impl Authorizer {
    #[must_use]
    pub fn new(enforcer: Arc<casbin::Enforcer>) -> Self {
        Self { enforcer }
    }

    /// Whether the principal's role grants `action` on `resource`.
    ///
    /// ## Errors
    ///
    /// Returns `CasbinError` if Casbin evaluation fails.
    pub fn check(&self, principal: &Principal, resource: Resource, action: Action) -> ServiceResult<bool> {
        let allowed = self
            .enforcer
            .enforce((
                principal.role.as_str(),
                resource.as_casbin_object(),
                action.as_casbin_action(),
            ))
            .map_err(ServiceError::CasbinError)?;

        tracing::debug!(
            subject = %principal.subject,
            role = %principal.role,
            resource = %resource,
            action = %action,
            allowed,
            "Authorization check"
        );
        Ok(allowed)
    }

    /// ## Errors
    ///
    /// - Returns `AuthorizationError` if access is denied.
    /// - Returns `CasbinError` if Casbin evaluation fails.
    pub fn require(&self, principal: &Principal, resource: Resource, action: Action) -> ServiceResult<()> {
        if self.check(principal, resource, action)? {
            Ok(())
        } else {
            Err(ServiceError::AuthorizationError(format!(
                "Access denied: {action} on {resource} for role {}",
                principal.role
            )))
        }
    }
}

/// Create an authorizer from the depot.
///
/// ## Errors
///
/// Returns `InvariantViolation` if the Casbin enforcer is not in the depot.
pub fn authorizer_from_depot(depot: &salvo::Depot) -> ServiceResult<Authorizer> {
    let enforcer = super::casbin::get_enforcer_from_depot(depot)?;
    Ok(Authorizer::new(enforcer))
}
