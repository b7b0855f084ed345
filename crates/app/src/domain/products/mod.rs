//! Products
//!
//! Read-only product facts consumed by the orders domain. Catalog management
//! lives elsewhere; this module only resolves a product's name and unit price.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use repository::{MockProductsRepository, PgProductsRepository, ProductsRepository};
pub use service::*;
