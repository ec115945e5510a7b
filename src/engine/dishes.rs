use tracing::info;

use crate::engine::payload::Payload;
use crate::error::AppError;
use crate::models::dish::{Dish, DishFields};
use crate::store::Records;

pub const MISSING_PROPERTIES: &str =
    "A name, description, price, and image_url property are all required";

/// State shared by the dish stages of one request.
pub struct DishContext<'a> {
    pub dishes: &'a mut Records<Dish>,
    pub dish_id: &'a str,
    pub payload: Payload<'a>,
    /// Set by [`body_has_all_properties`].
    pub fields: Option<DishFields>,
    /// Set by [`dish_exists`].
    pub found: Option<usize>,
}

impl<'a> DishContext<'a> {
    pub fn new(dishes: &'a mut Records<Dish>, dish_id: &'a str, payload: Payload<'a>) -> Self {
        Self {
            dishes,
            dish_id,
            payload,
            fields: None,
            found: None,
        }
    }
}

pub fn body_has_all_properties(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    let payload = ctx.payload;
    match (
        payload.non_empty_str("name"),
        payload.non_empty_str("description"),
        payload.positive_number("price"),
        payload.non_empty_str("image_url"),
    ) {
        (Some(name), Some(description), Some(price), Some(image_url)) => {
            ctx.fields = Some(DishFields {
                name: name.to_string(),
                description: description.to_string(),
                price: price.clone(),
                image_url: image_url.to_string(),
            });
            Ok(())
        }
        _ => Err(AppError::BadRequest(MISSING_PROPERTIES.to_string())),
    }
}

pub fn dish_exists(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    ctx.found = Some(locate(ctx.dishes, ctx.dish_id)?);
    Ok(())
}

fn locate(dishes: &Records<Dish>, dish_id: &str) -> Result<usize, AppError> {
    dishes
        .position(dish_id)
        .ok_or_else(|| AppError::NotFound(format!("Dish does not exist: {dish_id}.")))
}

pub fn read(dishes: &Records<Dish>, dish_id: &str) -> Result<Dish, AppError> {
    let index = locate(dishes, dish_id)?;
    dishes
        .get(index)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Dish does not exist: {dish_id}.")))
}

pub fn create(ctx: &mut DishContext<'_>) -> Result<Dish, AppError> {
    let fields = take_fields(ctx)?;
    let id = ctx.dishes.next_id();
    let dish = ctx.dishes.push(Dish::new(id, fields)).clone();

    info!(dish_id = %dish.id, "dish created");
    Ok(dish)
}

pub fn update(ctx: &mut DishContext<'_>) -> Result<Dish, AppError> {
    if ctx.payload.conflicts_with("id", ctx.dish_id) {
        return Err(AppError::BadRequest(format!(
            "Data id field {} does not match route id: {}",
            ctx.payload.display("id"),
            ctx.dish_id
        )));
    }

    let fields = take_fields(ctx)?;
    let index = ctx
        .found
        .ok_or_else(|| AppError::Internal("dish update ran before dish lookup".to_string()))?;
    let dish = ctx
        .dishes
        .get_mut(index)
        .ok_or_else(|| AppError::Internal(format!("dish {} vanished", ctx.dish_id)))?;

    dish.apply(fields);
    info!(dish_id = %dish.id, "dish updated");
    Ok(dish.clone())
}

fn take_fields(ctx: &mut DishContext<'_>) -> Result<DishFields, AppError> {
    ctx.fields
        .take()
        .ok_or_else(|| AppError::Internal("dish payload was not validated".to_string()))
}
