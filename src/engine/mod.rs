pub mod dishes;
pub mod orders;
pub mod payload;
pub mod pipeline;
