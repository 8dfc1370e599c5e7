use salvo::Depot;
use salvo::http::{Method, header::AUTHORIZATION};

use dossier_service::auth::{authenticate_bearer, depot::depot_keys};

use crate::config::get_config_from_depot;
use crate::error::AppError;

/// ## Summary
/// Middleware handler for bearer-token authentication.
/// Use this as a hoop on routes that require a known caller.
pub struct AuthMiddleware;

/// ## Summary
/// Authenticates the request and stores the principal in the depot.
///
/// ## Side Effects
/// Inserts the authenticated principal under
/// `depot_keys::AUTHENTICATED_PRINCIPAL` for downstream handlers.
///
/// ## Errors
/// Responds 401 and stops the chain if the token is missing or unknown.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        if req.method() == Method::OPTIONS {
            return;
        }

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(err) => {
                err.write_to(res);
                ctrl.skip_rest();
                return;
            }
        };

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match authenticate_bearer(header, &config.auth) {
            Ok(principal) => {
                tracing::debug!(subject = %principal.subject, role = %principal.role, "Request authenticated");
                depot.insert(depot_keys::AUTHENTICATED_PRINCIPAL, principal);
            }
            Err(err) => {
                AppError::from(err).write_to(res);
                ctrl.skip_rest();
            }
        }
    }
}
