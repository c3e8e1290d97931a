use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Ordered, validated product list. Products that fail validation never enter the catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, DomainError> {
        let mut catalog = Self::default();
        for product in products {
            catalog.add(product)?;
        }
        Ok(catalog)
    }

    pub fn add(&mut self, product: Product) -> Result<(), DomainError> {
        product.validate()?;
        if self.find(&product.id).is_some() {
            return Err(DomainError::InvalidProduct {
                product_id: product.id.0,
                reason: "duplicate product id".to_string(),
            });
        }
        self.products.push(product);
        Ok(())
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
