pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeedDataset, ProductSeedInfo, SeedResult, VerificationResult};
pub use repositories::{
    load_catalog, InMemoryProductRepository, ProductRepository, RepositoryError,
    SqlCartSnapshotStore, SqlProductRepository,
};
