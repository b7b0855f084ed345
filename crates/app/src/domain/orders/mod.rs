//! Orders
//!
//! Carts ("orders" while `PENDING`) and their line items, plus the nightly
//! sweep that hands finished carts over for delivery.

pub mod data;
pub mod errors;
mod locks;
pub mod models;
pub mod records;
mod repositories;
pub mod service;
pub mod sweep;

pub use errors::OrdersServiceError;
pub use repositories::{
    MockOrderItemsRepository, MockOrdersRepository, OrderItemsRepository, OrdersRepository,
    PgOrderItemsRepository, PgOrdersRepository,
};
pub use service::*;
pub use sweep::{SweepRunner, SweepSchedule, SweepWindow};
