//! Order Repositories
//!
//! Store collaborators for carts and their line items. Every call is atomic
//! on its own; multi-step consistency is the service's job.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::StoreError,
    domain::orders::records::{
        OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid,
    },
};

mod items;
mod orders;

pub use items::PgOrderItemsRepository;
pub use orders::PgOrdersRepository;

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// The customer's open (`PENDING`) cart, if any.
    async fn find_open_order(&self, email: &str) -> Result<Option<OrderRecord>, StoreError>;

    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, StoreError>;

    async fn create_order(&self, order: &OrderRecord) -> Result<OrderRecord, StoreError>;

    /// Set the status unless the order already has it. Returns rows changed,
    /// zero when the order is gone or already in `status`.
    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<u64, StoreError>;

    /// Delete an order and, by cascade, its items. Returns rows deleted.
    async fn delete_order(&self, order: OrderUuid) -> Result<u64, StoreError>;

    /// Orders created in `[start, end)` whose status differs from `excluding`.
    async fn find_orders_created_between(
        &self,
        start: Timestamp,
        end: Timestamp,
        excluding: OrderStatus,
    ) -> Result<Vec<OrderRecord>, StoreError>;
}

#[automock]
#[async_trait]
pub trait OrderItemsRepository: Send + Sync {
    async fn find_item(&self, item: OrderItemUuid) -> Result<Option<OrderItemRecord>, StoreError>;

    /// Insert the item, or update quantity and price when its UUID exists.
    async fn save_item(&self, item: &OrderItemRecord) -> Result<OrderItemRecord, StoreError>;

    async fn delete_item(&self, item: OrderItemUuid) -> Result<u64, StoreError>;

    /// Items of the customer's open cart, oldest first. Empty when there are none.
    async fn find_items_by_email(&self, email: &str) -> Result<Vec<OrderItemRecord>, StoreError>;

    /// Items of one cart, oldest first. Empty when there are none.
    async fn find_items_by_order(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, StoreError>;
}
