//! Order Models

use jiff::Timestamp;

use crate::domain::{
    orders::records::{OrderItemUuid, OrderStatus, OrderUuid},
    products::records::ProductUuid,
};

/// Order Model: a cart together with its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub email: String,
    pub address: String,
    pub postcode: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: Timestamp,
}

/// OrderItem Model
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub quantity: u32,
    pub price: u64,
    pub product_uuid: ProductUuid,
    pub product_name: String,
}

/// Result of adding a product to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedOrderItem {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub quantity: u32,
    pub price: u64,

    /// `true` when the product already had a line and it was topped up.
    pub merged: bool,
}

/// Outcome of one status sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub promoted: usize,
    pub failed: usize,
}
