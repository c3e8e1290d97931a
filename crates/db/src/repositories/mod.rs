use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use replique_core::cpq::catalog::Catalog;
use replique_core::domain::product::{Product, ProductId};
use replique_core::errors::ApplicationError;

pub mod cart_snapshot;
pub mod memory;
pub mod product;

pub use cart_snapshot::SqlCartSnapshotStore;
pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Catalog read model. `list` returns products in catalog (insertion) order.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

/// Builds the in-memory catalog from whatever the repository holds. A stored product that
/// fails validation is skipped and logged; the rest of the catalog stays reachable.
pub async fn load_catalog<R>(repository: &R) -> Result<Catalog, RepositoryError>
where
    R: ProductRepository + ?Sized,
{
    let mut catalog = Catalog::default();
    for product in repository.list().await? {
        let product_id = product.id.clone();
        if let Err(error) = catalog.add(product) {
            warn!(
                event_name = "catalog.product.rejected",
                product_id = %product_id.0,
                error = %error,
                "skipping invalid product while loading catalog"
            );
        }
    }
    Ok(catalog)
}
