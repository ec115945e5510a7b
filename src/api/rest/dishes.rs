use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::api::rest::{method_not_allowed, observe, request_body, Envelope, RequestBody};
use crate::engine::dishes::{self as stages, DishContext};
use crate::engine::payload::Payload;
use crate::engine::pipeline::Pipeline;
use crate::error::AppError;
use crate::models::dish::Dish;
use crate::state::AppState;

const RESOURCE: &str = "dishes";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/dishes",
            get(list_dishes)
                .post(create_dish)
                .fallback(method_not_allowed),
        )
        .route(
            "/dishes/:dish_id",
            get(read_dish)
                .put(update_dish)
                .fallback(method_not_allowed),
        )
}

async fn list_dishes(State(state): State<Arc<AppState>>) -> Json<Envelope<Vec<Dish>>> {
    let dishes = state.dishes.snapshot().await;
    state.metrics.observe_request(RESOURCE, "list", true);
    Envelope::json(dishes)
}

async fn create_dish(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Dish>>), AppError> {
    let body = request_body(body)?;
    let mut dishes = state.dishes.write().await;

    let mut ctx = DishContext::new(&mut dishes, "", Payload::new(&body.data));
    let result = Pipeline::new(RESOURCE, &state.metrics)
        .stage("body_has_all_properties", stages::body_has_all_properties)
        .run(&mut ctx, stages::create);
    state.metrics.set_collection_size(RESOURCE, dishes.len());

    let dish = observe(&state.metrics, RESOURCE, "create", result)?;
    Ok((StatusCode::CREATED, Envelope::json(dish)))
}

async fn read_dish(
    State(state): State<Arc<AppState>>,
    Path(dish_id): Path<String>,
) -> Result<Json<Envelope<Dish>>, AppError> {
    let dishes = state.dishes.read().await;
    let dish = observe(
        &state.metrics,
        RESOURCE,
        "read",
        stages::read(&dishes, &dish_id),
    )?;
    Ok(Envelope::json(dish))
}

async fn update_dish(
    State(state): State<Arc<AppState>>,
    Path(dish_id): Path<String>,
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<Json<Envelope<Dish>>, AppError> {
    let body = request_body(body)?;
    let mut dishes = state.dishes.write().await;

    let mut ctx = DishContext::new(&mut dishes, &dish_id, Payload::new(&body.data));
    let result = Pipeline::new(RESOURCE, &state.metrics)
        .stage("dish_exists", stages::dish_exists)
        .stage("body_has_all_properties", stages::body_has_all_properties)
        .run(&mut ctx, stages::update);

    let dish = observe(&state.metrics, RESOURCE, "update", result)?;
    Ok(Envelope::json(dish))
}
