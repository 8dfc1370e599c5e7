mod healthcheck;
mod intake_classification;
mod intake_tickets;
mod recurring_events;

use salvo::{Depot, Request, Router};
use uuid::Uuid;

use dossier_service::auth::{Action, Resource, authorizer_from_depot, depot::get_principal_from_depot};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthMiddleware;

// Re-export route constants from core
pub use dossier_core::constants::{
    HEALTHCHECK_ROUTE_COMPONENT, INTAKE_CLASSIFICATION_ROUTE_COMPONENT,
    INTAKE_CLASSIFICATION_ROUTE_PREFIX, INTAKE_TICKETS_ROUTE_COMPONENT,
    INTAKE_TICKETS_ROUTE_PREFIX, RECURRING_EVENTS_ROUTE_COMPONENT, RECURRING_EVENTS_ROUTE_PREFIX,
    SERIES_ROUTE_COMPONENT, SERIES_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router. Everything but the healthcheck sits behind
/// bearer authentication.
///
/// ## Errors
/// Returns an error if any child route handler fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::new().push(healthcheck::routes()).push(
        Router::new()
            .hoop(AuthMiddleware)
            .push(recurring_events::routes())
            .push(intake_classification::routes())
            .push(intake_tickets::routes()),
    ))
}

/// ## Summary
/// Check that the authenticated caller's role grants `action` on `resource`.
///
/// ## Errors
/// - `NotAuthenticated` if no principal is in the depot.
/// - `AuthorizationError` if the role does not grant the permission.
pub(crate) fn require_permission(depot: &Depot, resource: Resource, action: Action) -> AppResult<()> {
    let principal = get_principal_from_depot(depot)?;
    authorizer_from_depot(depot)?.require(principal, resource, action)?;
    Ok(())
}

/// ## Errors
/// Returns `BadRequest` if the path parameter is missing or not a UUID.
pub(crate) fn uuid_param(req: &Request, name: &str) -> AppResult<Uuid> {
    let raw = req.param::<String>(name).unwrap_or_default();
    Uuid::parse_str(&raw).map_err(|err| AppError::bad_request(&format!("{name}: {err}")))
}

/// ## Errors
/// Returns `BadRequest` if the body is not JSON matching `T`.
pub(crate) async fn json_body<T: serde::de::DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>()
        .await
        .map_err(|err| AppError::bad_request(&err))
}
