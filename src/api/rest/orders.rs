use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::Value;

use crate::api::rest::{method_not_allowed, observe, request_body, Envelope, RequestBody};
use crate::engine::orders::{self as stages, OrderContext};
use crate::engine::payload::Payload;
use crate::engine::pipeline::Pipeline;
use crate::error::AppError;
use crate::models::order::Order;
use crate::state::AppState;

const RESOURCE: &str = "orders";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/orders",
            get(list_orders)
                .post(create_order)
                .fallback(method_not_allowed),
        )
        .route(
            "/orders/:order_id",
            get(read_order)
                .put(update_order)
                .delete(delete_order)
                .fallback(method_not_allowed),
        )
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Envelope<Vec<Order>>> {
    let orders = state.orders.snapshot().await;
    state.metrics.observe_request(RESOURCE, "list", true);
    Envelope::json(orders)
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Order>>), AppError> {
    let body = request_body(body)?;
    let mut orders = state.orders.write().await;

    let mut ctx = OrderContext::new(&mut orders, "", Payload::new(&body.data));
    let result = Pipeline::new(RESOURCE, &state.metrics)
        .stage("order_has_valid_fields", stages::order_has_valid_fields)
        .stage("status_is_known", stages::status_is_known)
        .run(&mut ctx, stages::create);
    state.metrics.set_collection_size(RESOURCE, orders.len());

    let order = observe(&state.metrics, RESOURCE, "create", result)?;
    Ok((StatusCode::CREATED, Envelope::json(order)))
}

async fn read_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<Order>>, AppError> {
    let orders = state.orders.read().await;
    let order = observe(
        &state.metrics,
        RESOURCE,
        "read",
        stages::read(&orders, &order_id),
    )?;
    Ok(Envelope::json(order))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<Json<Envelope<Order>>, AppError> {
    let body = request_body(body)?;
    let mut orders = state.orders.write().await;

    let mut ctx = OrderContext::new(&mut orders, &order_id, Payload::new(&body.data));
    let result = Pipeline::new(RESOURCE, &state.metrics)
        .stage("order_exists", stages::order_exists)
        .stage("order_has_valid_fields", stages::order_has_valid_fields)
        .stage("update_order_id_is_valid", stages::update_order_id_is_valid)
        .stage("status_is_valid", stages::status_is_valid)
        .run(&mut ctx, stages::update);

    let order = observe(&state.metrics, RESOURCE, "update", result)?;
    Ok(Envelope::json(order))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut orders = state.orders.write().await;

    let empty = Value::Null;
    let mut ctx = OrderContext::new(&mut orders, &order_id, Payload::new(&empty));
    let result = Pipeline::new(RESOURCE, &state.metrics)
        .stage("order_exists", stages::order_exists)
        .run(&mut ctx, stages::destroy);
    state.metrics.set_collection_size(RESOURCE, orders.len());

    observe(&state.metrics, RESOURCE, "destroy", result)?;
    Ok(StatusCode::NO_CONTENT)
}
