//! Products service errors.

use thiserror::Error;

use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product not found")]
    NotFound,

    #[error("storage error")]
    Store(#[from] StoreError),
}
