use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::dimensions::Dimensions;
use crate::domain::options::{Category, FinishColor, Material};
use crate::errors::DomainError;

/// Largest base side a product may declare, in centimeters. Keeps every clamped volume
/// representable for pricing.
pub const MAX_BASE_SIDE_CM: u32 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A furniture template as published by the catalog. Read-only from the configurator's view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Whole currency units (Naira).
    pub base_price: u64,
    pub base_dimensions: Dimensions,
    pub image_url: String,
    pub available_materials: Vec<Material>,
    pub available_colors: Vec<FinishColor>,
}

impl Product {
    pub fn default_material(&self) -> Option<Material> {
        self.available_materials.first().copied()
    }

    pub fn default_color(&self) -> Option<FinishColor> {
        self.available_colors.first().copied()
    }

    pub fn offers_material(&self, material: Material) -> bool {
        self.available_materials.contains(&material)
    }

    pub fn offers_color(&self, color: FinishColor) -> bool {
        self.available_colors.contains(&color)
    }

    /// Rejects product data the configurator cannot price or seed from.
    pub fn validate(&self) -> Result<(), DomainError> {
        let reject = |reason: &str| DomainError::InvalidProduct {
            product_id: self.id.0.clone(),
            reason: reason.to_string(),
        };

        if self.id.0.trim().is_empty() {
            return Err(reject("product id must not be blank"));
        }
        if self.base_price == 0 {
            return Err(reject("base_price must be greater than zero"));
        }
        if !self.base_dimensions.is_positive() {
            return Err(reject("base_dimensions must be positive on every axis"));
        }
        if self.base_dimensions.largest_side() > Decimal::from(MAX_BASE_SIDE_CM) {
            return Err(reject("base_dimensions must not exceed 10000 cm on any axis"));
        }
        if self.available_materials.is_empty() {
            return Err(reject("available_materials must not be empty"));
        }
        if self.available_colors.is_empty() {
            return Err(reject("available_colors must not be empty"));
        }

        let mut seen_materials = HashSet::new();
        if !self.available_materials.iter().all(|material| seen_materials.insert(*material)) {
            return Err(reject("available_materials contains duplicates"));
        }
        let mut seen_colors = HashSet::new();
        if !self.available_colors.iter().all(|color| seen_colors.insert(*color)) {
            return Err(reject("available_colors contains duplicates"));
        }

        Ok(())
    }
}
