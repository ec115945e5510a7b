pub mod dishes;
pub mod orders;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(dishes::router())
        .merge(orders::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{ "data": ... }` wrapper around every successful response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn json(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Incoming `{ "data": {...} }` body. A body without `data` is an empty payload.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub data: Value,
}

pub(crate) fn request_body(
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<RequestBody, AppError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

pub(crate) fn observe<T>(
    metrics: &Metrics,
    resource: &str,
    operation: &str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    metrics.observe_request(resource, operation, result.is_ok());
    result
}

pub(crate) async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::MethodNotAllowed(format!("{method} not allowed for {}", uri.path()))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("Path not found: {}", uri.path()))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    dishes: usize,
    orders: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        dishes: state.dishes.len().await,
        orders: state.orders.len().await,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
