use serde::{Deserialize, Serialize};

use crate::domain::dimensions::Dimensions;
use crate::domain::options::{FinishColor, Material};
use crate::domain::product::{Product, ProductId};

/// A shopper's in-progress choice for one product. Lives only as long as its session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub product_id: ProductId,
    pub material: Material,
    pub color: FinishColor,
    pub dimensions: Dimensions,
    pub assembly_requested: bool,
    pub quantity: u32,
}

impl Configuration {
    /// First declared material and color, base dimensions, no assembly, quantity one.
    /// `None` when the product declares no options.
    pub fn defaults_for(product: &Product) -> Option<Self> {
        Some(Self {
            product_id: product.id.clone(),
            material: product.default_material()?,
            color: product.default_color()?,
            dimensions: product.base_dimensions,
            assembly_requested: false,
            quantity: 1,
        })
    }

    pub fn is_customized(&self, product: &Product) -> bool {
        self.dimensions != product.base_dimensions
    }
}
