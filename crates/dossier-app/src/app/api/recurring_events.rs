use chrono::{NaiveDate, Utc};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;

use dossier_db::model::series::SeriesException;
use dossier_service::auth::{Action, Resource};
use dossier_service::recurring::{
    self,
    types::{
        AddExceptionRequest, CreateSeriesRequest, CreateSeriesResponse, DeleteSeriesRequest,
        DeleteSeriesResponse, OccurrenceQuery, OccurrencesResponse, RRuleResponse,
        UpdateSeriesRequest, UpdateSeriesResponse,
    },
};

use super::{
    RECURRING_EVENTS_ROUTE_COMPONENT, SERIES_ROUTE_COMPONENT, json_body, require_permission,
    uuid_param,
};
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult, respond};
use crate::store_handler::get_series_repo_from_depot;

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// ## Summary
/// POST /recurring-events/create - Create a series and its master entry.
#[handler]
async fn create_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = create(req, depot).await;
    respond(res, StatusCode::CREATED, result);
}

async fn create(req: &mut Request, depot: &Depot) -> AppResult<CreateSeriesResponse> {
    require_permission(depot, Resource::Series, Action::Write)?;
    let request: CreateSeriesRequest = json_body(req).await?;
    let repo = get_series_repo_from_depot(depot)?;
    let config = get_config_from_depot(depot)?;
    Ok(recurring::create_series(repo.as_ref(), &config.recurrence, request, Utc::now()).await?)
}

/// ## Summary
/// GET /recurring-events/series/{id}/occurrences - List occurrences in a
/// date window with exceptions applied.
#[handler]
async fn occurrences_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = occurrences(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn occurrences(req: &mut Request, depot: &Depot) -> AppResult<OccurrencesResponse> {
    require_permission(depot, Resource::Series, Action::Read)?;
    let series_id = uuid_param(req, "id")?;
    let query = req
        .parse_queries::<OccurrenceQuery>()
        .map_err(|err| AppError::bad_request(&err))?;
    let repo = get_series_repo_from_depot(depot)?;
    let config = get_config_from_depot(depot)?;
    Ok(recurring::list_occurrences(repo.as_ref(), &config.recurrence, series_id, &query).await?)
}

/// ## Summary
/// PUT /recurring-events/series/{id}/update - Apply a scoped edit.
#[handler]
async fn update_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = update(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn update(req: &mut Request, depot: &Depot) -> AppResult<UpdateSeriesResponse> {
    require_permission(depot, Resource::Series, Action::Write)?;
    let series_id = uuid_param(req, "id")?;
    let request: UpdateSeriesRequest = json_body(req).await?;
    let repo = get_series_repo_from_depot(depot)?;
    Ok(recurring::update_series(repo.as_ref(), series_id, request, Utc::now()).await?)
}

/// ## Summary
/// DELETE /recurring-events/series/{id}/delete - Apply a scoped delete.
#[handler]
async fn delete_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = delete(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn delete(req: &mut Request, depot: &Depot) -> AppResult<DeleteSeriesResponse> {
    require_permission(depot, Resource::Series, Action::Write)?;
    let series_id = uuid_param(req, "id")?;
    let request: DeleteSeriesRequest = json_body(req).await?;
    let repo = get_series_repo_from_depot(depot)?;
    Ok(recurring::delete_series(repo.as_ref(), series_id, request, Utc::now()).await?)
}

/// ## Summary
/// POST /recurring-events/series/{id}/exceptions - Cancel or override one
/// occurrence.
#[handler]
async fn add_exception_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = add_exception(req, depot).await;
    respond(res, StatusCode::CREATED, result);
}

async fn add_exception(req: &mut Request, depot: &Depot) -> AppResult<SeriesException> {
    require_permission(depot, Resource::Series, Action::Write)?;
    let series_id = uuid_param(req, "id")?;
    let request: AddExceptionRequest = json_body(req).await?;
    let repo = get_series_repo_from_depot(depot)?;
    Ok(recurring::add_exception(repo.as_ref(), series_id, request, Utc::now()).await?)
}

/// ## Summary
/// DELETE /recurring-events/series/{id}/exceptions/{date} - Restore an
/// occurrence to the series defaults.
#[handler]
async fn remove_exception_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = remove_exception(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn remove_exception(req: &mut Request, depot: &Depot) -> AppResult<SuccessResponse> {
    require_permission(depot, Resource::Series, Action::Write)?;
    let series_id = uuid_param(req, "id")?;
    let raw = req.param::<String>("date").unwrap_or_default();
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|err| AppError::bad_request(&format!("date: {err}")))?;
    let repo = get_series_repo_from_depot(depot)?;
    recurring::remove_exception(repo.as_ref(), series_id, date).await?;
    Ok(SuccessResponse { success: true })
}

/// ## Summary
/// GET /recurring-events/series/{id}/rrule - Export the series as
/// `DTSTART`/`RRULE` text.
#[handler]
async fn rrule_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = rrule(req, depot).await;
    respond(res, StatusCode::OK, result);
}

async fn rrule(req: &mut Request, depot: &Depot) -> AppResult<RRuleResponse> {
    require_permission(depot, Resource::Series, Action::Read)?;
    let series_id = uuid_param(req, "id")?;
    let repo = get_series_repo_from_depot(depot)?;
    Ok(recurring::export_rrule(repo.as_ref(), series_id).await?)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(RECURRING_EVENTS_ROUTE_COMPONENT)
        .push(Router::with_path("create").post(create_handler))
        .push(
            Router::with_path(format!("{SERIES_ROUTE_COMPONENT}/{{id}}"))
                .push(Router::with_path("occurrences").get(occurrences_handler))
                .push(Router::with_path("update").put(update_handler))
                .push(Router::with_path("delete").delete(delete_handler))
                .push(
                    Router::with_path("exceptions")
                        .post(add_exception_handler)
                        .push(Router::with_path("{date}").delete(remove_exception_handler)),
                )
                .push(Router::with_path("rrule").get(rrule_handler)),
        )
}
