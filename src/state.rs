use crate::error::AppError;
use crate::models::dish::Dish;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;
use crate::store::seed::Seed;
use crate::store::{Collection, Records};

pub struct AppState {
    pub dishes: Collection<Dish>,
    pub orders: Collection<Order>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self::from_records(Records::default(), Records::default())
    }

    pub fn with_seed(seed: Seed) -> Result<Self, AppError> {
        let (dishes, orders) = seed.into_records()?;
        Ok(Self::from_records(dishes, orders))
    }

    fn from_records(dishes: Records<Dish>, orders: Records<Order>) -> Self {
        let metrics = Metrics::new();
        metrics.set_collection_size("dishes", dishes.len());
        metrics.set_collection_size("orders", orders.len());

        Self {
            dishes: Collection::new(dishes),
            orders: Collection::new(orders),
            metrics,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
