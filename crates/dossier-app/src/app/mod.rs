pub mod api;

use std::sync::Arc;

use dossier_core::config::Settings;
use dossier_service::auth::casbin::CasbinEnforcerHandler;
use salvo::{Router, Service};

use crate::config::ConfigHandler;
use crate::middleware::cors::CorsHandler;
use crate::store_handler::StoreHandler;

/// ## Summary
/// Assemble the full HTTP service: depot hoops, API routes, and CORS.
///
/// ## Errors
/// Returns an error if any child route fails to initialize.
pub fn service(
    settings: Arc<Settings>,
    store: StoreHandler,
    enforcer: Arc<casbin::Enforcer>,
) -> anyhow::Result<Service> {
    let cors = CorsHandler::new(&settings.server.cors_allow_origin);

    let router = Router::new()
        .hoop(ConfigHandler { settings })
        .hoop(store)
        .hoop(CasbinEnforcerHandler { enforcer })
        .push(api::routes()?);

    Ok(Service::new(router).hoop(cors))
}
