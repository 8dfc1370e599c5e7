use chrono::Utc;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;

use dossier_db::model::intake::IntakeTicket;
use dossier_service::auth::{Action, Resource};
use dossier_service::intake::{self, types::RegisterTicketRequest};

use super::{INTAKE_TICKETS_ROUTE_COMPONENT, json_body, require_permission, uuid_param};
use crate::error::{AppResult, respond};
use crate::store_handler::get_intake_repo_from_depot;

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: IntakeTicket,
}

/// ## Summary
/// POST /intake-tickets - Register a ticket for classification.
#[handler]
async fn register_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = register(req, depot).await;
    respond(res, StatusCode::CREATED, result);
}

async fn register(req: &mut Request, depot: &Depot) -> AppResult<TicketResponse> {
    require_permission(depot, Resource::Tickets, Action::Write)?;
    let request: RegisterTicketRequest = json_body(req).await?;
    let repo = get_intake_repo_from_depot(depot)?;
    let ticket = intake::register_ticket(repo.as_ref(), request, Utc::now()).await?;
    Ok(TicketResponse { ticket })
}

#[handler]
async fn get_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = get(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn get(req: &mut Request, depot: &Depot) -> AppResult<TicketResponse> {
    require_permission(depot, Resource::Tickets, Action::Read)?;
    let ticket_id = uuid_param(req, "id")?;
    let repo = get_intake_repo_from_depot(depot)?;
    let ticket = intake::get_ticket(repo.as_ref(), ticket_id).await?;
    Ok(TicketResponse { ticket })
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(INTAKE_TICKETS_ROUTE_COMPONENT)
        .post(register_handler)
        .push(Router::with_path("{id}").get(get_handler))
}
