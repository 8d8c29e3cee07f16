use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::clock::Clock;
use super::domain::{EvaluationId, NewEvaluation, TrackStatus};
use super::listing::{ListQuery, ViewFilter};
use super::reopen::ReopenError;
use super::service::{EvaluationService, EvaluationServiceError};
use super::store::{EvaluationStore, StoreError};
use super::tracks::{TrackError, TrackUpdate};

type SharedService<S, C> = Arc<EvaluationService<S, C>>;

/// Router builder exposing the evaluation lifecycle and analytics endpoints.
pub fn evaluation_router<S, C>(service: SharedService<S, C>) -> Router
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/evaluations",
            get(list_handler::<S, C>).post(register_handler::<S, C>),
        )
        .route("/api/v1/evaluations/:id", get(get_handler::<S, C>))
        .route(
            "/api/v1/evaluations/:id/internal",
            put(internal_track_handler::<S, C>),
        )
        .route(
            "/api/v1/evaluations/:id/client",
            put(client_track_handler::<S, C>),
        )
        .route(
            "/api/v1/evaluations/:id/reopen",
            post(reopen_handler::<S, C>),
        )
        .route(
            "/api/v1/associates/:associate_id/history",
            get(history_handler::<S, C>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<S, C>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    pub(crate) view: Option<ViewFilter>,
    #[serde(default)]
    pub(crate) q: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

impl TryFrom<ListParams> for ListQuery {
    type Error = EvaluationServiceError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(TrackStatus::parse_label(raw).ok_or_else(|| {
                EvaluationServiceError::InvalidInput(format!("unknown track status '{raw}'"))
            })?),
        };
        Ok(Self {
            view: params.view.unwrap_or_default(),
            text: params.q,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReopenRequest {
    #[serde(default)]
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) reopened_by: String,
}

pub(crate) async fn list_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Query(params): Query<ListParams>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    let query = match ListQuery::try_from(params) {
        Ok(query) => query,
        Err(err) => return error_response(err),
    };
    match service.list_evaluations(&query) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    axum::Json(new): axum::Json<NewEvaluation>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.register(new) {
        Ok(evaluation) => (StatusCode::CREATED, axum::Json(evaluation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Path(id): Path<String>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.get(&EvaluationId(id)) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn internal_track_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Path(id): Path<String>,
    axum::Json(update): axum::Json<TrackUpdate>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.update_internal_track(&EvaluationId(id), update) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn client_track_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Path(id): Path<String>,
    axum::Json(update): axum::Json<TrackUpdate>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.update_client_track(&EvaluationId(id), update) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reopen_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ReopenRequest>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.reopen_evaluation(&EvaluationId(id), &request.reason, &request.reopened_by) {
        Ok(reopened) => (StatusCode::OK, axum::Json(reopened)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    Path(associate_id): Path<String>,
) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.associate_history(&associate_id) {
        Ok(timeline) => {
            let payload = json!({
                "associateId": associate_id,
                "timeline": timeline,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<S, C>(State(service): State<SharedService<S, C>>) -> Response
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    match service.dashboard_analytics() {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: EvaluationServiceError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (status_for(&err), axum::Json(payload)).into_response()
}

pub(crate) fn status_for(err: &EvaluationServiceError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        match err {
            EvaluationServiceError::InvalidInput(_)
            | EvaluationServiceError::Reopen(ReopenError::MissingReason)
            | EvaluationServiceError::Reopen(ReopenError::MissingActor) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EvaluationServiceError::Reopen(ReopenError::NotCompleted(_))
            | EvaluationServiceError::Track(TrackError::ClientTrackLocked { .. })
            | EvaluationServiceError::Track(TrackError::EvaluationCompleted(_))
            | EvaluationServiceError::Track(TrackError::Store(StoreError::Conflict(_)))
            | EvaluationServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            EvaluationServiceError::Reopen(ReopenError::StorageConflict { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
