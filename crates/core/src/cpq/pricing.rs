use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::dimensions::Dimensions;
use crate::domain::options::Material;
use crate::domain::product::Product;

pub const DEFAULT_ASSEMBLY_FEE: u64 = 15_000;
pub const DEFAULT_DELIVERY_FEE: u64 = 5_000;

/// Fixed fees in whole currency units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub assembly_fee: u64,
    pub delivery_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { assembly_fee: DEFAULT_ASSEMBLY_FEE, delivery_fee: DEFAULT_DELIVERY_FEE }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PricingInput<'a> {
    pub product: &'a Product,
    pub material: Material,
    pub dimensions: Dimensions,
    pub assembly_requested: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub volume_ratio: Decimal,
    pub size_multiplier: Decimal,
    pub material_multiplier: Decimal,
    pub raw_price: Decimal,
    pub assembly_fee: u64,
    pub unit_price: u64,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, input: &PricingInput<'_>) -> PricingResult;
    fn fees(&self) -> FeeSchedule;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicPricingEngine {
    fees: FeeSchedule,
}

impl DeterministicPricingEngine {
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, input: &PricingInput<'_>) -> PricingResult {
        price_with_trace(input, self.fees.assembly_fee)
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }
}

pub fn volume_ratio(dimensions: &Dimensions, base: &Dimensions) -> Decimal {
    // Zero or oversized base volumes are rejected when products load; fall back to
    // "unchanged" rather than dividing by zero or overflowing.
    dimensions
        .volume()
        .zip(base.volume())
        .and_then(|(volume, base_volume)| volume.checked_div(base_volume))
        .unwrap_or(Decimal::ONE)
}

/// 40% of the price is fixed, 60% scales with volume relative to the base design.
pub fn size_multiplier(volume_ratio: Decimal) -> Decimal {
    Decimal::new(4, 1) + Decimal::new(6, 1) * volume_ratio
}

pub fn compute_unit_price(
    product: &Product,
    material: Material,
    dimensions: &Dimensions,
    assembly_requested: bool,
    assembly_fee: u64,
) -> u64 {
    price_with_trace(
        &PricingInput { product, material, dimensions: *dimensions, assembly_requested },
        assembly_fee,
    )
    .unit_price
}

pub fn compute_total_price(unit_price: u64, quantity: u32) -> u64 {
    unit_price.saturating_mul(u64::from(quantity))
}

pub fn price_with_trace(input: &PricingInput<'_>, assembly_fee: u64) -> PricingResult {
    let volume_ratio = volume_ratio(&input.dimensions, &input.product.base_dimensions);
    let size_multiplier = size_multiplier(volume_ratio);
    let material_multiplier = input.material.multiplier();
    let raw_price = Decimal::from(input.product.base_price) * material_multiplier * size_multiplier;
    let assembly_fee = if input.assembly_requested { assembly_fee } else { 0 };
    let unit_price = round_to_whole_units(raw_price + Decimal::from(assembly_fee));

    PricingResult {
        volume_ratio,
        size_multiplier,
        material_multiplier,
        raw_price,
        assembly_fee,
        unit_price,
        trace: vec![
            PricingTraceStep {
                stage: "volume_ratio".to_string(),
                detail: "(w * h * d) / (base_w * base_h * base_d)".to_string(),
                amount: volume_ratio,
            },
            PricingTraceStep {
                stage: "size_multiplier".to_string(),
                detail: "0.4 + 0.6 * volume_ratio".to_string(),
                amount: size_multiplier,
            },
            PricingTraceStep {
                stage: "material_multiplier".to_string(),
                detail: format!("lookup({})", input.material),
                amount: material_multiplier,
            },
            PricingTraceStep {
                stage: "raw_price".to_string(),
                detail: "base_price * material_multiplier * size_multiplier".to_string(),
                amount: raw_price,
            },
            PricingTraceStep {
                stage: "assembly_fee".to_string(),
                detail: if input.assembly_requested { "requested" } else { "not requested" }
                    .to_string(),
                amount: Decimal::from(assembly_fee),
            },
            PricingTraceStep {
                stage: "unit_price".to_string(),
                detail: "round_half_up(raw_price + assembly_fee)".to_string(),
                amount: Decimal::from(unit_price),
            },
        ],
    }
}

fn round_to_whole_units(value: Decimal) -> u64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    match rounded.to_u64() {
        Some(units) => units,
        None if rounded.is_sign_negative() => 0,
        None => u64::MAX,
    }
}
