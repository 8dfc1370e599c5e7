use std::sync::Arc;

use dossier_db::db::{IntakeRepository, SeriesRepository};
use salvo::async_trait;

use crate::error::{AppError, AppResult};

/// Injects the repositories every API handler reads from.
pub struct StoreHandler {
    pub series: Arc<dyn SeriesRepository>,
    pub intake: Arc<dyn IntakeRepository>,
}

impl StoreHandler {
    /// Serve both repositories from one store.
    #[must_use]
    pub fn shared<S: SeriesRepository + IntakeRepository + 'static>(store: Arc<S>) -> Self {
        Self {
            series: Arc::clone(&store) as Arc<dyn SeriesRepository>,
            intake: store,
        }
    }
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.series));
        depot.inject(Arc::clone(&self.intake));
    }
}

/// ## Summary
/// Retrieves the series repository from the depot.
///
/// ## Errors
/// Returns `Unavailable` if no repository was injected for this request.
pub fn get_series_repo_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn SeriesRepository>> {
    depot
        .obtain::<Arc<dyn SeriesRepository>>()
        .cloned()
        .map_err(|_err| AppError::Unavailable("Series repository not found in depot"))
}

/// ## Summary
/// Retrieves the intake repository from the depot.
///
/// ## Errors
/// Returns `Unavailable` if no repository was injected for this request.
pub fn get_intake_repo_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn IntakeRepository>> {
    depot
        .obtain::<Arc<dyn IntakeRepository>>()
        .cloned()
        .map_err(|_err| AppError::Unavailable("Intake repository not found in depot"))
}
