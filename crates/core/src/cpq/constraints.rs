use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::dimensions::{Axis, Dimensions};

/// Inclusive range a single axis may be customized within.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBounds {
    pub min: Decimal,
    pub max: Decimal,
    pub base: Decimal,
}

impl DimensionBounds {
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub axis: Axis,
    pub bounds: DimensionBounds,
}

pub trait DimensionValidator: Send + Sync {
    fn clamp(&self, requested: Decimal, base: Decimal) -> Decimal;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DimensionConstraintValidator;

impl DimensionValidator for DimensionConstraintValidator {
    fn clamp(&self, requested: Decimal, base: Decimal) -> Decimal {
        clamp(requested, base)
    }
}

/// `[round(base * 0.8), round(base * 1.5)]`. A zero base degenerates to `[0, 0]`.
pub fn bounds(base: Decimal) -> DimensionBounds {
    DimensionBounds {
        min: round_half_up(base * Decimal::new(8, 1)),
        max: round_half_up(base * Decimal::new(15, 1)),
        base,
    }
}

/// Out-of-range values are pulled to the nearest bound, never rejected.
pub fn clamp(requested: Decimal, base: Decimal) -> Decimal {
    let DimensionBounds { min, max, .. } = bounds(base);
    requested.max(min).min(max)
}

pub fn clamp_dimensions(requested: &Dimensions, base: &Dimensions) -> Dimensions {
    Axis::ALL.iter().fold(*requested, |dimensions, axis| {
        dimensions.with_axis(*axis, clamp(requested.get(*axis), base.get(*axis)))
    })
}

pub fn axis_bounds(base: &Dimensions) -> [AxisBounds; 3] {
    Axis::ALL.map(|axis| AxisBounds { axis, bounds: bounds(base.get(axis)) })
}

/// Undo every customization. Identity on the base.
pub fn reset_to_base(base: &Dimensions) -> Dimensions {
    *base
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
