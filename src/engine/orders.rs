use serde_json::Value;
use tracing::info;

use crate::engine::payload::{integer_value, is_truthy, Payload};
use crate::error::AppError;
use crate::models::order::{LineItem, Order, OrderFields, OrderStatus};
use crate::store::Records;

pub const REQUIRED_FIELDS: [&str; 3] = ["deliverTo", "mobileNumber", "dishes"];
const TYPED_FIELDS: [&str; 5] = ["id", "deliverTo", "mobileNumber", "status", "dishes"];
pub const AT_LEAST_ONE_DISH: &str = "Order must include at least one dish";
pub const INVALID_STATUS: &str =
    "Order must have a status of pending, preparing, out-for-delivery, delivered";
pub const DELIVERED_IS_FINAL: &str = "A delivered order cannot be changed";
pub const ONLY_PENDING_DELETES: &str = "An order cannot be deleted unless it is pending";

/// State shared by the order stages of one request.
pub struct OrderContext<'a> {
    pub orders: &'a mut Records<Order>,
    pub order_id: &'a str,
    pub payload: Payload<'a>,
    /// Set by [`order_has_valid_fields`].
    pub fields: Option<OrderFields>,
    /// Set by [`order_exists`].
    pub found: Option<usize>,
}

impl<'a> OrderContext<'a> {
    pub fn new(orders: &'a mut Records<Order>, order_id: &'a str, payload: Payload<'a>) -> Self {
        Self {
            orders,
            order_id,
            payload,
            fields: None,
            found: None,
        }
    }

    fn found_index(&self) -> Result<usize, AppError> {
        self.found
            .ok_or_else(|| AppError::Internal("order stage ran before order lookup".to_string()))
    }
}

pub fn order_has_valid_fields(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let payload = ctx.payload;

    for field in REQUIRED_FIELDS {
        if !payload.truthy(field) {
            return Err(missing(field));
        }
    }

    let deliver_to = payload
        .non_empty_str("deliverTo")
        .ok_or_else(|| missing("deliverTo"))?;
    let mobile_number = payload
        .non_empty_str("mobileNumber")
        .ok_or_else(|| missing("mobileNumber"))?;

    let items = match payload.get("dishes") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest(AT_LEAST_ONE_DISH.to_string())),
    };
    let dishes = items
        .iter()
        .enumerate()
        .map(|(index, item)| line_item(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    // Unknown statuses are left for `status_is_known` / `status_is_valid`.
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse);

    let mut extra = payload.object().cloned().unwrap_or_default();
    for field in TYPED_FIELDS {
        extra.remove(field);
    }

    ctx.fields = Some(OrderFields {
        deliver_to: deliver_to.to_string(),
        mobile_number: mobile_number.to_string(),
        status,
        dishes,
        extra,
    });
    Ok(())
}

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("Order must include a {field}"))
}

fn line_item(index: usize, item: &Value) -> Result<LineItem, AppError> {
    let quantity = item
        .get("quantity")
        .filter(|quantity| is_truthy(quantity))
        .and_then(integer_value)
        .filter(|quantity| *quantity != 0)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Dish {index} must have a quantity that is an integer greater than 0"
            ))
        })?;

    let id = item.get("id").and_then(Value::as_str).map(str::to_string);

    let mut extra = item.as_object().cloned().unwrap_or_default();
    if id.is_some() {
        extra.remove("id");
    }
    extra.remove("quantity");

    Ok(LineItem {
        id,
        quantity,
        extra,
    })
}

fn requested_status(payload: Payload<'_>) -> Result<OrderStatus, AppError> {
    payload
        .get("status")
        .filter(|status| is_truthy(status))
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse)
        .ok_or_else(|| AppError::BadRequest(INVALID_STATUS.to_string()))
}

/// Create-side status check: a status is optional, but one that is sent must
/// be recognised.
pub fn status_is_known(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    if ctx.payload.truthy("status") {
        requested_status(ctx.payload)?;
    }
    Ok(())
}

pub fn order_exists(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    ctx.found = Some(locate(ctx.orders, ctx.order_id)?);
    Ok(())
}

fn locate(orders: &Records<Order>, order_id: &str) -> Result<usize, AppError> {
    orders
        .position(order_id)
        .ok_or_else(|| AppError::NotFound(format!("Order does not exist: {order_id}.")))
}

/// Rejects missing or unknown statuses, any request to mark the order
/// delivered, and any change to an order that already is.
// TODO: allow `delivered` as a target once product confirms the transition
// should be reachable through this endpoint.
pub fn status_is_valid(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    if requested_status(ctx.payload)? == OrderStatus::Delivered {
        return Err(AppError::BadRequest(DELIVERED_IS_FINAL.to_string()));
    }

    if let Some(order) = ctx.found.and_then(|index| ctx.orders.get(index)) {
        if order.has_status(OrderStatus::Delivered) {
            return Err(AppError::BadRequest(DELIVERED_IS_FINAL.to_string()));
        }
    }

    Ok(())
}

pub fn update_order_id_is_valid(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    if ctx.payload.conflicts_with("id", ctx.order_id) {
        return Err(AppError::BadRequest(format!(
            "Order id does not match route id. Order: {}, Route: {}.",
            ctx.payload.display("id"),
            ctx.order_id
        )));
    }
    Ok(())
}

pub fn read(orders: &Records<Order>, order_id: &str) -> Result<Order, AppError> {
    let index = locate(orders, order_id)?;
    orders
        .get(index)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Order does not exist: {order_id}.")))
}

pub fn create(ctx: &mut OrderContext<'_>) -> Result<Order, AppError> {
    let fields = take_fields(ctx)?;
    let id = ctx.orders.next_id();
    let order = ctx.orders.push(Order::new(id, fields)).clone();

    info!(order_id = %order.id, "order created");
    Ok(order)
}

pub fn update(ctx: &mut OrderContext<'_>) -> Result<Order, AppError> {
    let fields = take_fields(ctx)?;
    let index = ctx.found_index()?;
    let order = ctx
        .orders
        .get_mut(index)
        .ok_or_else(|| AppError::Internal(format!("order {} vanished", ctx.order_id)))?;

    order.apply(fields);
    info!(order_id = %order.id, status = ?order.status, "order updated");
    Ok(order.clone())
}

pub fn destroy(ctx: &mut OrderContext<'_>) -> Result<Order, AppError> {
    let index = ctx.found_index()?;
    let pending = ctx
        .orders
        .get(index)
        .map(|order| order.has_status(OrderStatus::Pending))
        .ok_or_else(|| AppError::Internal(format!("order {} vanished", ctx.order_id)))?;

    if !pending {
        return Err(AppError::BadRequest(ONLY_PENDING_DELETES.to_string()));
    }

    let order = ctx
        .orders
        .remove(index)
        .ok_or_else(|| AppError::Internal(format!("order {} vanished", ctx.order_id)))?;

    info!(order_id = %order.id, "order deleted");
    Ok(order)
}

fn take_fields(ctx: &mut OrderContext<'_>) -> Result<OrderFields, AppError> {
    ctx.fields
        .take()
        .ok_or_else(|| AppError::Internal("order payload was not validated".to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn stored(id: &str, status: Option<OrderStatus>) -> Order {
        Order {
            id: id.to_string(),
            deliver_to: "1600 Pennsylvania Avenue NW".to_string(),
            mobile_number: "(202) 456-1111".to_string(),
            status,
            dishes: vec![LineItem {
                id: Some("d1".to_string()),
                quantity: 1,
                extra: Default::default(),
            }],
            extra: Default::default(),
        }
    }

    fn valid_payload() -> Value {
        json!({
            "deliverTo": "123 Main",
            "mobileNumber": "555-1212",
            "dishes": [{ "id": "d1", "quantity": 2 }]
        })
    }

    fn validate(data: &Value) -> Result<OrderFields, AppError> {
        let mut orders = Records::default();
        let mut ctx = OrderContext::new(&mut orders, "", Payload::new(data));
        order_has_valid_fields(&mut ctx)?;
        Ok(ctx.fields.take().unwrap())
    }

    fn bad_request(message: &str) -> AppError {
        AppError::BadRequest(message.to_string())
    }

    #[test]
    fn accepts_a_minimal_order() {
        let fields = validate(&valid_payload()).unwrap();
        assert_eq!(fields.dishes[0].quantity, 2);
        assert_eq!(fields.status, None);
    }

    #[test]
    fn names_the_first_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut data = valid_payload();
            data[field] = json!("");
            assert_eq!(
                validate(&data),
                Err(bad_request(&format!("Order must include a {field}")))
            );
        }
    }

    #[test]
    fn dishes_must_be_a_non_empty_array() {
        for dishes in [json!([]), json!("d1"), json!({ "id": "d1" })] {
            let mut data = valid_payload();
            data["dishes"] = dishes;
            assert_eq!(validate(&data), Err(bad_request(AT_LEAST_ONE_DISH)));
        }
    }

    #[test]
    fn quantity_must_be_a_nonzero_integer() {
        for quantity in [json!(0), json!(1.5), json!("2"), Value::Null] {
            let mut data = valid_payload();
            data["dishes"] = json!([{ "id": "d1", "quantity": 1 }, { "id": "d2", "quantity": quantity }]);
            assert_eq!(
                validate(&data),
                Err(bad_request(
                    "Dish 1 must have a quantity that is an integer greater than 0"
                ))
            );
        }
    }

    #[test]
    fn negative_quantities_pass() {
        let mut data = valid_payload();
        data["dishes"][0]["quantity"] = json!(-3);
        assert_eq!(validate(&data).unwrap().dishes[0].quantity, -3);
    }

    #[test]
    fn line_items_keep_snapshot_fields() {
        let mut data = valid_payload();
        data["dishes"][0]["name"] = json!("Falafel");
        let fields = validate(&data).unwrap();
        assert_eq!(fields.dishes[0].extra["name"], "Falafel");
        assert!(!fields.dishes[0].extra.contains_key("quantity"));
    }

    #[test]
    fn line_items_without_an_id_pass() {
        let mut data = valid_payload();
        data["dishes"] = json!([{ "quantity": 2 }, { "id": 7, "quantity": 1 }]);
        let fields = validate(&data).unwrap();

        assert_eq!(fields.dishes[0].id, None);
        assert_eq!(fields.dishes[1].id, None);
        assert_eq!(fields.dishes[1].extra["id"], 7);
    }

    #[test]
    fn out_of_range_quantity_is_rejected() {
        let mut data = valid_payload();
        data["dishes"][0]["quantity"] = json!(1e20);
        assert_eq!(
            validate(&data),
            Err(bad_request(
                "Dish 0 must have a quantity that is an integer greater than 0"
            ))
        );
    }

    #[test]
    fn unknown_properties_are_kept_apart_from_typed_fields() {
        let mut data = valid_payload();
        data["id"] = json!("o9");
        data["status"] = json!("preparing");
        data["note"] = json!("ring bell");
        let fields = validate(&data).unwrap();

        assert_eq!(fields.status, Some(OrderStatus::Preparing));
        assert_eq!(fields.extra.len(), 1);
        assert_eq!(fields.extra["note"], "ring bell");
    }

    #[test]
    fn unknown_status_is_left_to_the_status_stages() {
        let mut data = valid_payload();
        data["status"] = json!("invalid");
        assert_eq!(validate(&data).unwrap().status, None);

        let mut orders = Records::default();
        let mut ctx = OrderContext::new(&mut orders, "", Payload::new(&data));
        assert_eq!(status_is_known(&mut ctx), Err(bad_request(INVALID_STATUS)));

        let data = valid_payload();
        let mut ctx = OrderContext::new(&mut orders, "", Payload::new(&data));
        assert_eq!(status_is_known(&mut ctx), Ok(()));
    }

    #[test]
    fn status_stage_rejects_missing_and_delivered() {
        let mut orders = Records::from_vec(vec![stored("o1", None)]).unwrap();

        let missing = valid_payload();
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&missing));
        order_exists(&mut ctx).unwrap();
        assert_eq!(status_is_valid(&mut ctx), Err(bad_request(INVALID_STATUS)));

        let mut delivered = valid_payload();
        delivered["status"] = json!("delivered");
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&delivered));
        order_exists(&mut ctx).unwrap();
        assert_eq!(status_is_valid(&mut ctx), Err(bad_request(DELIVERED_IS_FINAL)));

        let mut preparing = valid_payload();
        preparing["status"] = json!("preparing");
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&preparing));
        order_exists(&mut ctx).unwrap();
        assert_eq!(status_is_valid(&mut ctx), Ok(()));
    }

    #[test]
    fn stored_delivered_order_is_frozen() {
        let mut orders =
            Records::from_vec(vec![stored("o1", Some(OrderStatus::Delivered))]).unwrap();
        let mut data = valid_payload();
        data["status"] = json!("pending");
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&data));

        order_exists(&mut ctx).unwrap();
        assert_eq!(status_is_valid(&mut ctx), Err(bad_request(DELIVERED_IS_FINAL)));
    }

    #[test]
    fn route_id_mismatch_is_rejected() {
        let mut orders = Records::from_vec(vec![stored("o1", None)]).unwrap();
        let mut data = valid_payload();
        data["id"] = json!("o2");
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&data));

        assert_eq!(
            update_order_id_is_valid(&mut ctx),
            Err(bad_request(
                "Order id does not match route id. Order: o2, Route: o1."
            ))
        );
    }

    #[test]
    fn update_overwrites_supplied_fields() {
        let mut orders = Records::from_vec(vec![stored("o1", None)]).unwrap();
        let mut data = valid_payload();
        data["status"] = json!("out-for-delivery");
        let mut ctx = OrderContext::new(&mut orders, "o1", Payload::new(&data));

        order_exists(&mut ctx).unwrap();
        order_has_valid_fields(&mut ctx).unwrap();
        let order = update(&mut ctx).unwrap();

        assert_eq!(order.id, "o1");
        assert_eq!(order.deliver_to, "123 Main");
        assert_eq!(order.status, Some(OrderStatus::OutForDelivery));
        assert_eq!(orders.get(0).unwrap(), &order);
    }

    #[test]
    fn destroy_only_removes_pending_orders() {
        let mut orders = Records::from_vec(vec![
            stored("o1", Some(OrderStatus::Preparing)),
            stored("o2", Some(OrderStatus::Pending)),
            stored("o3", None),
        ])
        .unwrap();
        let data = Value::Null;

        for id in ["o1", "o3"] {
            let mut ctx = OrderContext::new(&mut orders, id, Payload::new(&data));
            order_exists(&mut ctx).unwrap();
            assert_eq!(destroy(&mut ctx), Err(bad_request(ONLY_PENDING_DELETES)));
        }

        let mut ctx = OrderContext::new(&mut orders, "o2", Payload::new(&data));
        order_exists(&mut ctx).unwrap();
        assert_eq!(destroy(&mut ctx).unwrap().id, "o2");

        assert_eq!(orders.len(), 2);
        assert!(orders.contains("o1"));
        assert!(orders.contains("o3"));
    }

    #[test]
    fn create_ignores_client_supplied_id() {
        let mut orders = Records::from_vec(vec![stored("o1", None)]).unwrap();
        let mut data = valid_payload();
        data["id"] = json!("o1");
        let mut ctx = OrderContext::new(&mut orders, "", Payload::new(&data));

        order_has_valid_fields(&mut ctx).unwrap();
        let order = create(&mut ctx).unwrap();

        assert_ne!(order.id, "o1");
        assert_eq!(orders.len(), 2);
    }
}
