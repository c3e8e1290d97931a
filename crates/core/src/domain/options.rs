use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Enumerated product option with a shopper-facing label.
pub trait OptionLabel: Copy {
    fn label(self) -> &'static str;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Mdf,
    BirchPlywood,
    SolidPine,
    OakVeneer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialTier {
    BudgetFriendly,
    Standard,
    PremiumFinish,
}

impl Material {
    pub const ALL: [Material; 4] =
        [Material::Mdf, Material::BirchPlywood, Material::SolidPine, Material::OakVeneer];

    /// Price multiplier applied to the product base price. Never below 1.0.
    pub fn multiplier(self) -> Decimal {
        match self {
            Self::Mdf => Decimal::ONE,
            Self::BirchPlywood => Decimal::new(12, 1),
            Self::SolidPine => Decimal::new(15, 1),
            Self::OakVeneer => Decimal::new(18, 1),
        }
    }

    pub fn tier(self) -> MaterialTier {
        match self {
            Self::Mdf => MaterialTier::BudgetFriendly,
            Self::OakVeneer => MaterialTier::PremiumFinish,
            Self::BirchPlywood | Self::SolidPine => MaterialTier::Standard,
        }
    }
}

impl OptionLabel for Material {
    fn label(self) -> &'static str {
        match self {
            Self::Mdf => "High-Grade MDF",
            Self::BirchPlywood => "Birch Plywood",
            Self::SolidPine => "Solid Pine",
            Self::OakVeneer => "Oak Veneer",
        }
    }
}

impl MaterialTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::BudgetFriendly => "Budget Friendly",
            Self::Standard => "Standard",
            Self::PremiumFinish => "Premium Finish",
        }
    }
}

/// Cosmetic finish. Has no effect on price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishColor {
    Natural,
    MatteWhite,
    MatteBlack,
    WalnutStain,
    SlateGrey,
}

impl FinishColor {
    pub const ALL: [FinishColor; 5] = [
        FinishColor::Natural,
        FinishColor::MatteWhite,
        FinishColor::MatteBlack,
        FinishColor::WalnutStain,
        FinishColor::SlateGrey,
    ];
}

impl OptionLabel for FinishColor {
    fn label(self) -> &'static str {
        match self {
            Self::Natural => "Natural",
            Self::MatteWhite => "Matte White",
            Self::MatteBlack => "Matte Black",
            Self::WalnutStain => "Walnut Stain",
            Self::SlateGrey => "Slate Grey",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LivingRoom,
    Bedroom,
    Office,
    Storage,
    Decor,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::LivingRoom,
        Category::Bedroom,
        Category::Office,
        Category::Storage,
        Category::Decor,
    ];

    /// Storage encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LivingRoom => "living_room",
            Self::Bedroom => "bedroom",
            Self::Office => "office",
            Self::Storage => "storage",
            Self::Decor => "decor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

impl OptionLabel for Category {
    fn label(self) -> &'static str {
        match self {
            Self::LivingRoom => "Living Room",
            Self::Bedroom => "Bedroom",
            Self::Office => "Office",
            Self::Storage => "Storage",
            Self::Decor => "Decor",
        }
    }
}

macro_rules! display_by_label {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

display_by_label!(Material, FinishColor, Category);

impl std::str::FromStr for Material {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_exact(value, &Material::ALL, "material")
    }
}

impl std::str::FromStr for FinishColor {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_exact(value, &FinishColor::ALL, "finish color")
    }
}

/// Exact, case-insensitive match on label or snake_case key. Free-form hints go through
/// the preference resolver instead.
fn parse_exact<T: OptionLabel + fmt::Debug>(
    value: &str,
    options: &[T],
    kind: &str,
) -> Result<T, DomainError> {
    let needle = value.trim().to_ascii_lowercase();
    options
        .iter()
        .copied()
        .find(|option| {
            option.label().to_ascii_lowercase() == needle
                || option.label().to_ascii_lowercase().replace([' ', '-'], "_") == needle
                || format!("{option:?}").to_ascii_lowercase() == needle.replace('_', "")
        })
        .ok_or_else(|| DomainError::UnknownOption {
            kind: kind.to_string(),
            value: value.to_string(),
        })
}
