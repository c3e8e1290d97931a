use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::dimensions::Dimensions;
use crate::domain::options::{FinishColor, Material};
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLineId(pub String);

impl CartLineId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub material: Material,
    pub color: FinishColor,
    pub dimensions: Dimensions,
    pub assembly_requested: bool,
    /// Quote frozen when the line was first added. Never repriced.
    pub unit_price: u64,
    pub image_url: String,
}

/// Fields that decide whether two lines are the same purchasable configuration.
/// Quantity, price and line id are deliberately absent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConsolidationKey {
    pub product_id: ProductId,
    pub material: Material,
    pub color: FinishColor,
    pub assembly_requested: bool,
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
}

impl CartLineItem {
    pub fn consolidation_key(&self) -> ConsolidationKey {
        ConsolidationKey {
            product_id: self.product_id.clone(),
            material: self.material,
            color: self.color,
            assembly_requested: self.assembly_requested,
            width: self.dimensions.width,
            height: self.dimensions.height,
            depth: self.dimensions.depth,
        }
    }

    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLineItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: u64,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line a new item with this key would merge into.
    pub fn line_for_key_mut(&mut self, key: &ConsolidationKey) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| &line.consolidation_key() == key)
    }

    /// Delivery is charged once per order and only when something is in the cart.
    pub fn totals(&self, delivery_fee: u64) -> CartTotals {
        let item_count = self.lines.iter().map(|line| u64::from(line.quantity)).sum();
        let subtotal =
            self.lines.iter().fold(0u64, |acc, line| acc.saturating_add(line.line_total()));
        let delivery_fee = if self.is_empty() { 0 } else { delivery_fee };

        CartTotals {
            item_count,
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
        }
    }
}
