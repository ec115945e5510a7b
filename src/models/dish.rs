use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Kept as the client sent it so `1900` does not come back as `1900.0`.
    pub price: Number,
    pub image_url: String,
}

/// Dish fields that passed validation, waiting for an id or a target record.
#[derive(Debug, Clone, PartialEq)]
pub struct DishFields {
    pub name: String,
    pub description: String,
    pub price: Number,
    pub image_url: String,
}

impl Dish {
    pub fn new(id: String, fields: DishFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            image_url: fields.image_url,
        }
    }

    pub fn apply(&mut self, fields: DishFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.image_url = fields.image_url;
    }
}
