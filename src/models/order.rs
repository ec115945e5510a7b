use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::payload::is_truthy;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// One ordered dish. Snapshot fields the client sent along (name, price, ...)
/// are carried in `extra` and echoed back untouched, as is a non-string `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub quantity: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub deliver_to: String,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    pub dishes: Vec<LineItem>,
    /// Any other properties the client attached to the order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderFields {
    pub deliver_to: String,
    pub mobile_number: String,
    pub status: Option<OrderStatus>,
    pub dishes: Vec<LineItem>,
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(id: String, fields: OrderFields) -> Self {
        Self {
            id,
            deliver_to: fields.deliver_to,
            mobile_number: fields.mobile_number,
            status: fields.status,
            dishes: fields.dishes,
            extra: fields.extra,
        }
    }

    pub fn has_status(&self, status: OrderStatus) -> bool {
        self.status == Some(status)
    }

    /// Overwrites every field the payload supplied. Absent values leave the
    /// stored ones alone.
    pub fn apply(&mut self, fields: OrderFields) {
        if !fields.deliver_to.is_empty() {
            self.deliver_to = fields.deliver_to;
        }
        if !fields.mobile_number.is_empty() {
            self.mobile_number = fields.mobile_number;
        }
        if fields.status.is_some() {
            self.status = fields.status;
        }
        if !fields.dishes.is_empty() {
            self.dishes = fields.dishes;
        }
        for (key, value) in fields.extra {
            if is_truthy(&value) {
                self.extra.insert(key, value);
            }
        }
    }
}
