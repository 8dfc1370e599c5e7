use chrono::Utc;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};

use dossier_service::auth::{Action, Resource};
use dossier_service::intake::{
    self,
    types::{ClassificationResponse, FeedbackRequest, FeedbackResponse},
};

use super::{INTAKE_CLASSIFICATION_ROUTE_COMPONENT, json_body, require_permission, uuid_param};
use crate::config::get_config_from_depot;
use crate::error::{AppResult, respond};
use crate::store_handler::get_intake_repo_from_depot;

/// ## Summary
/// GET /intake-classification/{ticket_id} - Classify a ticket, reusing a
/// recent prediction when one exists.
#[handler]
async fn classify_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = classify(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn classify(req: &mut Request, depot: &Depot) -> AppResult<ClassificationResponse> {
    require_permission(depot, Resource::Classification, Action::Read)?;
    let ticket_id = uuid_param(req, "ticket_id")?;
    let repo = get_intake_repo_from_depot(depot)?;
    let config = get_config_from_depot(depot)?;
    Ok(intake::classify_ticket(repo.as_ref(), &config.intake, ticket_id, Utc::now()).await?)
}

/// ## Summary
/// POST /intake-classification/{ticket_id}/feedback - Record the values a
/// reviewer settled on.
#[handler]
async fn feedback_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = feedback(req, depot).await;
    respond(res, StatusCode::CREATED, result);
}

async fn feedback(req: &mut Request, depot: &Depot) -> AppResult<FeedbackResponse> {
    require_permission(depot, Resource::Feedback, Action::Write)?;
    let ticket_id = uuid_param(req, "ticket_id")?;
    let request: FeedbackRequest = json_body(req).await?;
    let repo = get_intake_repo_from_depot(depot)?;
    Ok(intake::submit_feedback(repo.as_ref(), ticket_id, request, Utc::now()).await?)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(INTAKE_CLASSIFICATION_ROUTE_COMPONENT).push(
        Router::with_path("{ticket_id}")
            .get(classify_handler)
            .push(Router::with_path("feedback").post(feedback_handler)),
    )
}
