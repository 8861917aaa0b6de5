use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{
    DamageIngestRequest, NormalizeRequest, QuoteRequest, ReviewSubmission, VehicleSubmission,
};
use super::repository::VehicleRepository;
use super::service::{DeskServiceError, VehicleDeskService};
use crate::valuation::VehicleId;

/// Router builder exposing the vehicle desk over HTTP.
pub fn desk_router<R>(service: Arc<VehicleDeskService<R>>) -> Router
where
    R: VehicleRepository + 'static,
{
    Router::new()
        .route("/api/v1/vehicles", post(register_handler::<R>))
        .route("/api/v1/vehicles/:vehicle_id", get(vehicle_handler::<R>))
        .route(
            "/api/v1/vehicles/:vehicle_id/reviews",
            post(review_handler::<R>),
        )
        .route(
            "/api/v1/vehicles/:vehicle_id/evaluation",
            get(evaluation_handler::<R>),
        )
        .route(
            "/api/v1/vehicles/:vehicle_id/damage-report",
            post(damage_report_handler::<R>),
        )
        .route("/api/v1/evaluations", get(evaluations_handler::<R>))
        .route("/api/v1/valuation/quote", post(quote_handler::<R>))
        .route("/api/v1/damage/normalize", post(normalize_handler::<R>))
        .with_state(service)
}

fn error_response(error: DeskServiceError) -> Response {
    let mut payload = json!({ "error": error.to_string() });
    if let DeskServiceError::Damage(damage) = &error {
        payload["kind"] = json!(damage.kind());
    }
    (error.status_code(), axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, DeskServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    axum::Json(submission): axum::Json<VehicleSubmission>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(StatusCode::CREATED, service.register(submission))
}

pub(crate) async fn vehicle_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    Path(vehicle_id): Path<String>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(StatusCode::OK, service.get(&VehicleId(vehicle_id)))
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    Path(vehicle_id): Path<String>,
    axum::Json(submission): axum::Json<ReviewSubmission>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_review(&VehicleId(vehicle_id), submission),
    )
}

pub(crate) async fn evaluation_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    Path(vehicle_id): Path<String>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(StatusCode::OK, service.evaluate(&VehicleId(vehicle_id)))
}

pub(crate) async fn evaluations_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(StatusCode::OK, service.evaluate_all())
}

pub(crate) async fn damage_report_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    Path(vehicle_id): Path<String>,
    axum::Json(request): axum::Json<DamageIngestRequest>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.ingest_damage_report(&VehicleId(vehicle_id), &request.raw_response),
    )
}

pub(crate) async fn quote_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.quote(&request))).into_response()
}

pub(crate) async fn normalize_handler<R>(
    State(service): State<Arc<VehicleDeskService<R>>>,
    axum::Json(request): axum::Json<NormalizeRequest>,
) -> Response
where
    R: VehicleRepository + 'static,
{
    let result = service
        .analyze(&request.raw_response, request.exchange_rate)
        .map_err(DeskServiceError::from);
    respond(StatusCode::OK, result)
}
