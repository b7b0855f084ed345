//! Orders service errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrdersServiceError {
    #[error("product not found")]
    ProductNotFound,

    #[error("line price {actual} does not match expected {expected}")]
    PriceMismatch { expected: u64, actual: u64 },

    #[error("quantity is zero or out of range")]
    InvalidQuantity,

    #[error("order not found")]
    OrderNotFound,

    #[error("order item not found")]
    OrderItemNotFound,

    #[error("order items could not be loaded")]
    OrderItemsNotFound,

    #[error("failed to add order item")]
    AddFailed,

    #[error("failed to modify order item")]
    ModifyFailed,

    #[error("failed to remove order item")]
    RemoveFailed,

    #[error("failed to sweep orders")]
    SweepFailed,
}
