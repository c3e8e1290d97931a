use tokio::sync::RwLock;

use replique_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};

/// Insertion-ordered, so `list` matches the SQL repository's catalog order.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        product.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;

        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }
}
