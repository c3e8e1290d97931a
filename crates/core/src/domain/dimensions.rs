use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Width, height and depth of a piece, in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Width,
    Height,
    Depth,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Width, Axis::Height, Axis::Depth];

    pub fn label(self) -> &'static str {
        match self {
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Depth => "Depth",
        }
    }
}

impl Dimensions {
    pub fn new(width: Decimal, height: Decimal, depth: Decimal) -> Self {
        Self { width, height, depth }
    }

    pub fn whole_cm(width: u32, height: u32, depth: u32) -> Self {
        Self::new(Decimal::from(width), Decimal::from(height), Decimal::from(depth))
    }

    pub fn get(&self, axis: Axis) -> Decimal {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
            Axis::Depth => self.depth,
        }
    }

    pub fn with_axis(mut self, axis: Axis, value: Decimal) -> Self {
        match axis {
            Axis::Width => self.width = value,
            Axis::Height => self.height = value,
            Axis::Depth => self.depth = value,
        }
        self
    }

    /// `None` when the product of the sides does not fit in a `Decimal`.
    pub fn volume(&self) -> Option<Decimal> {
        self.width.checked_mul(self.height)?.checked_mul(self.depth)
    }

    pub fn largest_side(&self) -> Decimal {
        self.width.max(self.height).max(self.depth)
    }

    pub fn is_positive(&self) -> bool {
        Axis::ALL.iter().all(|axis| self.get(*axis) > Decimal::ZERO)
    }
}
