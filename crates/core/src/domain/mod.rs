pub mod cart;
pub mod configuration;
pub mod dimensions;
pub mod options;
pub mod product;
