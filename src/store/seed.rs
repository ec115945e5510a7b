use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::dish::Dish;
use crate::models::order::Order;
use crate::store::Records;

/// Initial contents of both collections.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub dishes: Vec<Dish>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Seed {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::Internal(format!("failed to read seed file {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|err| AppError::Internal(format!("invalid seed data: {err}")))
    }

    pub fn into_records(self) -> Result<(Records<Dish>, Records<Order>), AppError> {
        Ok((Records::from_vec(self.dishes)?, Records::from_vec(self.orders)?))
    }
}

#[cfg(test)]
mod tests {
    use super::Seed;
    use crate::models::order::OrderStatus;

    #[test]
    fn missing_collections_default_to_empty() {
        let seed = Seed::from_json(r#"{ "dishes": [] }"#).unwrap();
        let (dishes, orders) = seed.into_records().unwrap();
        assert!(dishes.is_empty());
        assert!(orders.is_empty());
    }

    #[test]
    fn parses_dishes_and_orders() {
        let seed = Seed::from_json(
            r#"{
                "dishes": [{
                    "id": "d1",
                    "name": "Dolcelatte and chickpea spaghetti",
                    "description": "Spaghetti topped with a blend of dolcelatte and fresh chickpeas",
                    "price": 19,
                    "image_url": "https://example.com/spaghetti.jpg"
                }],
                "orders": [{
                    "id": "o1",
                    "deliverTo": "308 Negra Arroyo Lane",
                    "mobileNumber": "(505) 143-3369",
                    "status": "delivered",
                    "dishes": [{ "id": "d1", "quantity": 2 }]
                }]
            }"#,
        )
        .unwrap();

        let (dishes, orders) = seed.into_records().unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(orders.get(0).unwrap().status, Some(OrderStatus::Delivered));
    }

    #[test]
    fn duplicate_order_ids_fail() {
        let seed = Seed::from_json(
            r#"{ "orders": [
                { "id": "o1", "deliverTo": "a", "mobileNumber": "1", "dishes": [] },
                { "id": "o1", "deliverTo": "b", "mobileNumber": "2", "dishes": [] }
            ] }"#,
        )
        .unwrap();
        assert!(seed.into_records().is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Seed::from_json("{ not json").is_err());
    }
}
