//! Errors

use salvo::http::StatusError;
use tracing::error;

use brew_orders_app::domain::{orders::OrdersServiceError, products::ProductsServiceError};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        OrdersServiceError::OrderNotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::OrderItemNotFound => {
            StatusError::not_found().brief("Order item not found")
        }
        OrdersServiceError::OrderItemsNotFound => {
            StatusError::not_found().brief("Order items not found")
        }
        OrdersServiceError::PriceMismatch { expected, actual } => StatusError::bad_request()
            .brief("Price does not match product price")
            .detail(format!("expected {expected}, got {actual}")),
        OrdersServiceError::InvalidQuantity => StatusError::bad_request().brief("Invalid quantity"),
        OrdersServiceError::AddFailed
        | OrdersServiceError::ModifyFailed
        | OrdersServiceError::RemoveFailed
        | OrdersServiceError::SweepFailed => {
            error!("order request failed: {error}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn product_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::Store(source) => {
            error!("failed to load product: {source}");

            StatusError::internal_server_error()
        }
    }
}
