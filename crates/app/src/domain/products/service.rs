//! Products service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::domain::products::{
    errors::ProductsServiceError,
    records::{ProductRecord, ProductUuid},
    repository::ProductsRepository,
};

/// Products service backed by any [`ProductsRepository`].
#[derive(Clone)]
pub struct StoreProductsService {
    repository: Arc<dyn ProductsRepository>,
}

impl StoreProductsService {
    #[must_use]
    pub fn new(repository: Arc<dyn ProductsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ProductsService for StoreProductsService {
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        self.repository
            .get_product(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;
}
