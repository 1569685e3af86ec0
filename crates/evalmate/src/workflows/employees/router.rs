use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{EmployeeId, EmployeeRecord, FieldMap};
use super::feedback::FeedbackSummarizer;
use super::repository::{EmployeeRepository, RepositoryError};
use super::service::{EmployeeEvaluationService, EvaluationError};

/// Upper bound on records returned by the roster listing.
pub const ROSTER_LIMIT: usize = 200;

/// Router builder exposing the employee record and evaluation endpoints.
pub fn employee_router<R, S>(service: Arc<EmployeeEvaluationService<R, S>>) -> Router
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            post(ingest_handler::<R, S>).get(roster_handler::<R, S>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            get(status_handler::<R, S>)
                .put(amend_handler::<R, S>)
                .delete(remove_handler::<R, S>),
        )
        .route(
            "/api/v1/employees/:employee_id/evaluate",
            post(evaluate_handler::<R, S>),
        )
        .with_state(service)
}

fn error_response(error: EvaluationError) -> Response {
    let status = match &error {
        EvaluationError::NotFound(_) | EvaluationError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        EvaluationError::IncompleteRecord { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EvaluationError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EvaluationError::ModelInference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn ingest_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
    axum::Json(record): axum::Json<EmployeeRecord>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.ingest(record) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn roster_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.roster(ROSTER_LIMIT) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.get(&EmployeeId(employee_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn amend_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
    Path(employee_id): Path<String>,
    axum::Json(changes): axum::Json<FieldMap>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.amend(&EmployeeId(employee_id), changes) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.remove(&EmployeeId(employee_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluate_handler<R, S>(
    State(service): State<Arc<EmployeeEvaluationService<R, S>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    match service.evaluate(&EmployeeId(employee_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
