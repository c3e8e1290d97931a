pub mod cart;
pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod flows;

pub use cart::{AddOutcome, CartConsolidator, CartSnapshotStore, InMemoryCartSnapshotStore};
pub use cpq::catalog::Catalog;
pub use cpq::preferences::PreferenceHint;
pub use cpq::pricing::{DeterministicPricingEngine, FeeSchedule, PricingEngine};
pub use domain::cart::{Cart, CartLineId, CartLineItem, CartTotals};
pub use domain::configuration::Configuration;
pub use domain::dimensions::{Axis, Dimensions};
pub use domain::options::{Category, FinishColor, Material, MaterialTier};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError};
pub use flows::{ConfiguratorSession, PriceQuote, SessionError, SessionState};
