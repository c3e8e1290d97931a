pub mod catalog;
pub mod constraints;
pub mod preferences;
pub mod pricing;
