//! Orders service.

use std::{error::Error as _, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, error, info, warn};

use crate::{
    database::StoreError,
    domain::{
        orders::{
            data::NewOrderItem,
            errors::OrdersServiceError,
            locks::{CartGuard, CartLocks},
            models::{AddedOrderItem, Order, OrderItem, SweepReport},
            records::{
                MAX_QUANTITY, OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid,
            },
            repositories::{OrderItemsRepository, OrdersRepository},
            sweep::SweepWindow,
        },
        products::{
            ProductsRepository,
            records::{MAX_AMOUNT, ProductRecord},
        },
    },
};

/// Logs a store fault and replaces it with the operation's failure kind.
trait StoreResultExt<T> {
    fn or_fail(self, kind: OrdersServiceError, context: &str) -> Result<T, OrdersServiceError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_fail(self, kind: OrdersServiceError, context: &str) -> Result<T, OrdersServiceError> {
        self.map_err(|error| {
            error!(
                error = %error,
                source = ?error.source(),
                failure = %kind,
                "{context}"
            );

            kind
        })
    }
}

/// Orders service backed by any set of store collaborators.
pub struct StoreOrdersService {
    products: Arc<dyn ProductsRepository>,
    orders: Arc<dyn OrdersRepository>,
    items: Arc<dyn OrderItemsRepository>,
    locks: CartLocks,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsRepository>,
        orders: Arc<dyn OrdersRepository>,
        items: Arc<dyn OrderItemsRepository>,
    ) -> Self {
        Self {
            products,
            orders,
            items,
            locks: CartLocks::new(),
        }
    }

    /// Merge the requested line into `order` or start a new one.
    async fn write_line(
        &self,
        order: &OrderRecord,
        item: &NewOrderItem,
        line_price: u64,
        now: Timestamp,
    ) -> Result<AddedOrderItem, OrdersServiceError> {
        let lines = self
            .items
            .find_items_by_email(&item.email)
            .await
            .or_fail(OrdersServiceError::AddFailed, "failed to load order items")?;

        let existing = lines.into_iter().find(|line| {
            line.order_uuid == order.uuid && line.product_uuid == item.product_uuid
        });

        let merged = existing.is_some();

        let line = match existing {
            Some(mut line) => {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .filter(|quantity| *quantity <= MAX_QUANTITY)
                    .ok_or(OrdersServiceError::InvalidQuantity)?;

                line.price = line
                    .price
                    .checked_add(item.price)
                    .filter(|price| *price <= MAX_AMOUNT)
                    .ok_or(OrdersServiceError::InvalidQuantity)?;

                line.updated_at = now;

                line
            }
            None => OrderItemRecord {
                uuid: OrderItemUuid::new(),
                order_uuid: order.uuid,
                product_uuid: item.product_uuid,
                quantity: item.quantity,
                price: line_price,
                created_at: now,
                updated_at: now,
            },
        };

        let saved = self
            .items
            .save_item(&line)
            .await
            .or_fail(OrdersServiceError::AddFailed, "failed to save order item")?;

        Ok(AddedOrderItem {
            uuid: saved.uuid,
            order_uuid: saved.order_uuid,
            quantity: saved.quantity,
            price: saved.price,
            merged,
        })
    }

    /// Find an item, lock its cart, and read the item again under the lock.
    async fn lock_item(
        &self,
        item: OrderItemUuid,
        failure: OrdersServiceError,
    ) -> Result<(OrderItemRecord, CartGuard), OrdersServiceError> {
        let line = self
            .items
            .find_item(item)
            .await
            .or_fail(failure.clone(), "failed to load order item")?
            .ok_or(OrdersServiceError::OrderItemNotFound)?;

        let order = self
            .orders
            .find_order(line.order_uuid)
            .await
            .or_fail(failure.clone(), "failed to load order")?
            .ok_or(OrdersServiceError::OrderItemNotFound)?;

        let guard = self.locks.lock(&order.email).await;

        let line = self
            .items
            .find_item(item)
            .await
            .or_fail(failure, "failed to reload order item")?
            .ok_or(OrdersServiceError::OrderItemNotFound)?;

        Ok((line, guard))
    }

    /// Delete a line and drop its cart when nothing else is left in it.
    async fn delete_line(&self, line: &OrderItemRecord) -> Result<(), OrdersServiceError> {
        self.items
            .delete_item(line.uuid)
            .await
            .or_fail(OrdersServiceError::RemoveFailed, "failed to delete order item")?;

        let remaining = self
            .items
            .find_items_by_order(line.order_uuid)
            .await
            .or_fail(OrdersServiceError::RemoveFailed, "failed to load order items")?;

        if remaining.is_empty() {
            self.orders
                .delete_order(line.order_uuid)
                .await
                .or_fail(OrdersServiceError::RemoveFailed, "failed to delete empty order")?;

            debug!(order = %line.order_uuid, "deleted empty order");
        }

        Ok(())
    }

    async fn discard_order(&self, order: OrderUuid) {
        if let Err(error) = self.orders.delete_order(order).await {
            error!(error = %error, order = %order, "failed to discard empty order");
        }
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    async fn add_item(&self, item: NewOrderItem) -> Result<AddedOrderItem, OrdersServiceError> {
        if item.quantity == 0 || item.quantity > MAX_QUANTITY {
            return Err(OrdersServiceError::InvalidQuantity);
        }

        let _guard = self.locks.lock(&item.email).await;

        let product = self
            .products
            .get_product(item.product_uuid)
            .await
            .or_fail(OrdersServiceError::AddFailed, "failed to load product")?
            .filter(|product| product.name == item.product_name)
            .ok_or(OrdersServiceError::ProductNotFound)?;

        let expected = product
            .line_price(item.quantity)
            .ok_or(OrdersServiceError::InvalidQuantity)?;

        if expected != item.price {
            return Err(OrdersServiceError::PriceMismatch {
                expected,
                actual: item.price,
            });
        }

        let now = Timestamp::now();

        let open = self
            .orders
            .find_open_order(&item.email)
            .await
            .or_fail(OrdersServiceError::AddFailed, "failed to load order")?;

        let (order, created) = match open {
            Some(order) => (order, false),
            None => {
                let order = self
                    .orders
                    .create_order(&OrderRecord {
                        uuid: OrderUuid::new(),
                        email: item.email.clone(),
                        address: item.address.clone(),
                        postcode: item.postcode.clone(),
                        status: OrderStatus::Pending,
                        created_at: now,
                        updated_at: now,
                    })
                    .await
                    .or_fail(OrdersServiceError::AddFailed, "failed to create order")?;

                (order, true)
            }
        };

        let added = self.write_line(&order, &item, expected, now).await;

        if added.is_err() && created {
            self.discard_order(order.uuid).await;
        }

        added
    }

    async fn get_order(&self, email: &str) -> Result<Order, OrdersServiceError> {
        let order = match self.orders.find_open_order(email).await {
            Ok(Some(order)) => order,
            Ok(None) => return Err(OrdersServiceError::OrderNotFound),
            Err(error) => {
                error!(error = %error, "failed to load order");

                return Err(OrdersServiceError::OrderNotFound);
            }
        };

        let lines = self
            .items
            .find_items_by_order(order.uuid)
            .await
            .or_fail(OrdersServiceError::OrderItemsNotFound, "failed to load order items")?;

        if lines.is_empty() {
            warn!(order = %order.uuid, "order has no items");
        }

        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            let product: ProductRecord = self
                .products
                .get_product(line.product_uuid)
                .await
                .or_fail(OrdersServiceError::OrderItemsNotFound, "failed to load product")?
                .ok_or_else(|| {
                    warn!(
                        product = %line.product_uuid,
                        item = %line.uuid,
                        "order item references a missing product"
                    );

                    OrdersServiceError::OrderItemsNotFound
                })?;

            items.push(OrderItem {
                uuid: line.uuid,
                quantity: line.quantity,
                price: line.price,
                product_uuid: line.product_uuid,
                product_name: product.name,
            });
        }

        Ok(Order {
            uuid: order.uuid,
            email: order.email,
            address: order.address,
            postcode: order.postcode,
            status: order.status,
            items,
            created_at: order.created_at,
        })
    }

    async fn modify_item(
        &self,
        item: OrderItemUuid,
        quantity: i64,
    ) -> Result<(), OrdersServiceError> {
        let (mut line, _guard) = self.lock_item(item, OrdersServiceError::ModifyFailed).await?;

        if quantity <= 0 {
            return self.delete_line(&line).await;
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity <= MAX_QUANTITY)
            .ok_or(OrdersServiceError::InvalidQuantity)?;

        let product = self
            .products
            .get_product(line.product_uuid)
            .await
            .or_fail(OrdersServiceError::ModifyFailed, "failed to load product")?
            .ok_or_else(|| {
                error!(
                    product = %line.product_uuid,
                    item = %line.uuid,
                    "order item references a missing product"
                );

                OrdersServiceError::ModifyFailed
            })?;

        line.price = product
            .line_price(quantity)
            .ok_or(OrdersServiceError::InvalidQuantity)?;
        line.quantity = quantity;
        line.updated_at = Timestamp::now();

        self.items
            .save_item(&line)
            .await
            .or_fail(OrdersServiceError::ModifyFailed, "failed to save order item")?;

        Ok(())
    }

    async fn remove_item(&self, item: OrderItemUuid) -> Result<(), OrdersServiceError> {
        let (line, _guard) = self.lock_item(item, OrdersServiceError::RemoveFailed).await?;

        self.delete_line(&line).await
    }

    async fn promote_ready_orders(
        &self,
        window: SweepWindow,
    ) -> Result<SweepReport, OrdersServiceError> {
        let orders = self
            .orders
            .find_orders_created_between(window.start, window.end, OrderStatus::ReadyForDelivery)
            .await
            .or_fail(OrdersServiceError::SweepFailed, "failed to load orders to sweep")?;

        let mut report = SweepReport {
            window_start: window.start,
            window_end: window.end,
            promoted: 0,
            failed: 0,
        };

        for order in orders {
            match self
                .orders
                .update_order_status(order.uuid, OrderStatus::ReadyForDelivery)
                .await
            {
                Ok(0) => debug!(order = %order.uuid, "order changed during sweep, skipped"),
                Ok(_) => report.promoted += 1,
                Err(error) => {
                    error!(error = %error, order = %order.uuid, "failed to promote order");

                    report.failed += 1;
                }
            }
        }

        info!(
            window_start = %report.window_start,
            window_end = %report.window_end,
            promoted = report.promoted,
            failed = report.failed,
            "order sweep finished"
        );

        Ok(report)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Put a product into the customer's open cart, creating the cart if
    /// needed and topping up an existing line for the same product.
    async fn add_item(&self, item: NewOrderItem) -> Result<AddedOrderItem, OrdersServiceError>;

    /// The customer's open cart with its lines.
    async fn get_order(&self, email: &str) -> Result<Order, OrdersServiceError>;

    /// Set a line's quantity, repricing it from the product's current unit
    /// price. Zero or less removes the line.
    async fn modify_item(
        &self,
        item: OrderItemUuid,
        quantity: i64,
    ) -> Result<(), OrdersServiceError>;

    /// Remove a line, and its cart when it was the last one.
    async fn remove_item(&self, item: OrderItemUuid) -> Result<(), OrdersServiceError>;

    /// Promote every cart created inside `window` to ready-for-delivery.
    async fn promote_ready_orders(
        &self,
        window: SweepWindow,
    ) -> Result<SweepReport, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use jiff::{Timestamp, ToSpan};
    use testresult::TestResult;

    use crate::{
        database::StoreError,
        domain::{
            orders::{MockOrderItemsRepository, MockOrdersRepository},
            products::{MockProductsRepository, records::ProductUuid},
        },
        test::{TestContext, new_item, order_record, product_record},
    };

    use super::*;

    const JANE: &str = "jane@example.com";

    /// Long enough that unserialised writers would interleave.
    const CART_READ_DELAY: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn add_item_prices_a_new_line_from_the_unit_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 2)).await?;

        assert_eq!(added.quantity, 2);
        assert_eq!(added.price, 4_000);
        assert!(!added.merged);

        let orders = ctx.stored_orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].uuid, added.order_uuid);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].address, "1 Roastery Lane");

        Ok(())
    }

    #[tokio::test]
    async fn add_item_merges_lines_for_the_same_product() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let first = ctx.orders.add_item(new_item(JANE, &product, 2)).await?;
        let second = ctx.orders.add_item(new_item(JANE, &product, 1)).await?;

        assert_eq!(second.uuid, first.uuid);
        assert_eq!(second.quantity, 3);
        assert_eq!(second.price, 6_000);
        assert!(second.merged);

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(ctx.stored_orders().await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_keeps_separate_lines_for_different_products() -> TestResult {
        let ctx = TestContext::new().await;
        let kenya = ctx.add_product("Kenya AA", 2_000).await;
        let brazil = ctx.add_product("Brazil Santos", 1_500).await;

        let first = ctx.orders.add_item(new_item(JANE, &kenya, 1)).await?;
        let second = ctx.orders.add_item(new_item(JANE, &brazil, 1)).await?;

        assert_eq!(first.order_uuid, second.order_uuid);
        assert_ne!(first.uuid, second.uuid);
        assert_eq!(ctx.stored_items().await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_after_promotion_starts_a_new_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;
        let promoted = ctx
            .insert_order(&order_record(
                JANE,
                OrderStatus::ReadyForDelivery,
                Timestamp::now(),
            ))
            .await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 1)).await?;

        assert_ne!(added.order_uuid, promoted.uuid);
        assert_eq!(ctx.stored_orders().await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_price_mismatch_changes_nothing() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Brazil Santos", 1_500).await;

        let mut item = new_item(JANE, &product, 3);
        item.price = 5_000;

        let result = ctx.orders.add_item(item).await;

        assert_eq!(
            result,
            Err(OrdersServiceError::PriceMismatch {
                expected: 4_500,
                actual: 5_000,
            })
        );
        assert!(ctx.stored_orders().await.is_empty());
        assert!(ctx.stored_items().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let mut item = new_item(JANE, &product, 1);
        item.product_uuid = ProductUuid::new();

        let result = ctx.orders.add_item(item).await;

        assert_eq!(result, Err(OrdersServiceError::ProductNotFound));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_deleted_product_returns_not_found() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;
        ctx.delete_product(product.uuid).await;

        let result = ctx.orders.add_item(new_item(JANE, &product, 1)).await;

        assert_eq!(result, Err(OrdersServiceError::ProductNotFound));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_wrong_product_name_returns_not_found() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let mut item = new_item(JANE, &product, 1);
        item.product_name = "Kenya AB".to_string();

        let result = ctx.orders.add_item(item).await;

        assert_eq!(result, Err(OrdersServiceError::ProductNotFound));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_zero_quantity_is_rejected() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let result = ctx.orders.add_item(new_item(JANE, &product, 0)).await;

        assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_quantity_beyond_storage_is_rejected() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Sample Sachet", 1).await;

        let result = ctx
            .orders
            .add_item(new_item(JANE, &product, MAX_QUANTITY + 1))
            .await;

        assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_overflowing_price_is_rejected() {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Gold Leaf Espresso", MAX_AMOUNT).await;

        let result = ctx.orders.add_item(new_item(JANE, &product, 2)).await;

        assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));
        assert!(ctx.stored_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_item_merge_past_the_quantity_limit_keeps_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Sample Sachet", 1).await;

        let first = ctx
            .orders
            .add_item(new_item(JANE, &product, MAX_QUANTITY))
            .await?;

        let result = ctx.orders.add_item(new_item(JANE, &product, 1)).await;

        assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uuid, first.uuid);
        assert_eq!(items[0].quantity, MAX_QUANTITY);
        assert_eq!(ctx.stored_orders().await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_merge_past_the_amount_limit_keeps_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx
            .add_product("Gold Leaf Espresso", MAX_AMOUNT / 2 + 1)
            .await;

        ctx.orders.add_item(new_item(JANE, &product, 1)).await?;

        let result = ctx.orders.add_item(new_item(JANE, &product, 1)).await;

        assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].price, MAX_AMOUNT / 2 + 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_discards_a_fresh_order_when_the_line_cannot_be_saved() {
        let product = product_record("Kenya AA", 2_000);

        let mut products = MockProductsRepository::new();
        let stored = product.clone();
        products
            .expect_get_product()
            .once()
            .return_once(move |_| Ok(Some(stored)));

        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_open_order()
            .once()
            .return_once(|_| Ok(None));
        orders
            .expect_create_order()
            .once()
            .returning(|order| Ok(order.clone()));
        orders
            .expect_delete_order()
            .once()
            .return_once(|_| Ok(1));

        let mut items = MockOrderItemsRepository::new();
        items
            .expect_find_items_by_email()
            .once()
            .return_once(|_| Ok(Vec::new()));
        items
            .expect_save_item()
            .once()
            .return_once(|_| Err(StoreError::InvalidReference));

        let service = StoreOrdersService::new(Arc::new(products), Arc::new(orders), Arc::new(items));

        let result = service.add_item(new_item(JANE, &product, 2)).await;

        assert_eq!(result, Err(OrdersServiceError::AddFailed));
    }

    #[tokio::test]
    async fn add_item_store_failure_on_lookup_returns_add_failed() {
        let mut products = MockProductsRepository::new();
        products
            .expect_get_product()
            .once()
            .return_once(|_| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(products),
            Arc::new(MockOrdersRepository::new()),
            Arc::new(MockOrderItemsRepository::new()),
        );

        let product = product_record("Kenya AA", 2_000);

        let result = service.add_item(new_item(JANE, &product, 1)).await;

        assert_eq!(result, Err(OrdersServiceError::AddFailed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_of_one_product_yield_a_single_line() -> TestResult {
        let ctx = Arc::new(TestContext::with_slow_cart_reads(CART_READ_DELAY).await);
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let mut handles = Vec::new();

        for _ in 0..16 {
            let ctx = Arc::clone(&ctx);
            let item = new_item(JANE, &product, 1);

            handles.push(tokio::spawn(async move { ctx.orders.add_item(item).await }));
        }

        for handle in handles {
            handle.await??;
        }

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 16);
        assert_eq!(items[0].price, 32_000);
        assert_eq!(ctx.stored_orders().await.len(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn removing_the_last_line_while_adding_another_keeps_the_new_line() -> TestResult {
        let ctx = Arc::new(TestContext::with_slow_cart_reads(CART_READ_DELAY).await);
        let kenya = ctx.add_product("Kenya AA", 2_000).await;
        let brazil = ctx.add_product("Brazil Santos", 1_500).await;

        let last = ctx.orders.add_item(new_item(JANE, &kenya, 1)).await?;

        let remove = {
            let ctx = Arc::clone(&ctx);

            tokio::spawn(async move { ctx.orders.remove_item(last.uuid).await })
        };
        let add = {
            let ctx = Arc::clone(&ctx);
            let item = new_item(JANE, &brazil, 1);

            tokio::spawn(async move { ctx.orders.add_item(item).await })
        };

        remove.await??;
        add.await??;

        let order = ctx.orders.get_order(JANE).await?;
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_name, "Brazil Santos");
        assert_eq!(ctx.stored_orders().await.len(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn modifying_a_line_while_topping_it_up_applies_both_in_some_order() -> TestResult {
        let ctx = Arc::new(TestContext::with_slow_cart_reads(CART_READ_DELAY).await);
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let line = ctx.orders.add_item(new_item(JANE, &product, 1)).await?;

        let top_up = {
            let ctx = Arc::clone(&ctx);
            let item = new_item(JANE, &product, 1);

            tokio::spawn(async move { ctx.orders.add_item(item).await })
        };
        let modify = {
            let ctx = Arc::clone(&ctx);

            tokio::spawn(async move { ctx.orders.modify_item(line.uuid, 5).await })
        };

        top_up.await??;
        modify.await??;

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);

        // Top-up then modify leaves 5; modify then top-up leaves 6.
        let quantity = items[0].quantity;
        assert!(
            quantity == 5 || quantity == 6,
            "lost update: quantity is {quantity}"
        );
        assert_eq!(items[0].price, u64::from(quantity) * 2_000);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_returns_lines_with_product_names() -> TestResult {
        let ctx = TestContext::new().await;
        let kenya = ctx.add_product("Kenya AA", 2_000).await;
        let brazil = ctx.add_product("Brazil Santos", 1_500).await;

        let first = ctx.orders.add_item(new_item(JANE, &kenya, 2)).await?;
        ctx.orders.add_item(new_item(JANE, &brazil, 1)).await?;

        let order = ctx.orders.get_order(JANE).await?;

        assert_eq!(order.uuid, first.order_uuid);
        assert_eq!(order.email, JANE);
        assert_eq!(order.postcode, "BN1 1AA");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_name, "Kenya AA");
        assert_eq!(order.items[0].price, 4_000);
        assert_eq!(order.items[1].product_name, "Brazil Santos");
        assert_eq!(order.items[1].quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_unknown_email_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.get_order("nobody@example.com").await;

        assert_eq!(result, Err(OrdersServiceError::OrderNotFound));
    }

    #[tokio::test]
    async fn get_order_ignores_promoted_orders() {
        let ctx = TestContext::new().await;
        ctx.insert_order(&order_record(
            JANE,
            OrderStatus::ReadyForDelivery,
            Timestamp::now(),
        ))
        .await;

        let result = ctx.orders.get_order(JANE).await;

        assert_eq!(result, Err(OrdersServiceError::OrderNotFound));
    }

    #[tokio::test]
    async fn get_order_store_failure_returns_not_found() {
        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_open_order()
            .once()
            .return_once(|_| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(orders),
            Arc::new(MockOrderItemsRepository::new()),
        );

        let result = service.get_order(JANE).await;

        assert_eq!(result, Err(OrdersServiceError::OrderNotFound));
    }

    #[tokio::test]
    async fn get_order_without_items_returns_an_empty_list() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx
            .insert_order(&order_record(JANE, OrderStatus::Pending, Timestamp::now()))
            .await;

        let fetched = ctx.orders.get_order(JANE).await?;

        assert_eq!(fetched.uuid, order.uuid);
        assert!(fetched.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn get_order_with_a_deleted_product_returns_items_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        ctx.orders.add_item(new_item(JANE, &product, 1)).await?;
        ctx.delete_product(product.uuid).await;

        let result = ctx.orders.get_order(JANE).await;

        assert_eq!(result, Err(OrdersServiceError::OrderItemsNotFound));

        Ok(())
    }

    #[tokio::test]
    async fn get_order_item_query_failure_returns_items_not_found() {
        let order = order_record(JANE, OrderStatus::Pending, Timestamp::now());

        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_open_order()
            .once()
            .return_once(move |_| Ok(Some(order)));

        let mut items = MockOrderItemsRepository::new();
        items
            .expect_find_items_by_order()
            .once()
            .return_once(|_| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(orders),
            Arc::new(items),
        );

        let result = service.get_order(JANE).await;

        assert_eq!(result, Err(OrdersServiceError::OrderItemsNotFound));
    }

    #[tokio::test]
    async fn modify_item_to_zero_removes_the_line_and_empty_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 2)).await?;

        ctx.orders.modify_item(added.uuid, 0).await?;

        assert!(ctx.stored_items().await.is_empty());
        assert!(ctx.stored_orders().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn modify_item_to_negative_keeps_a_cart_with_other_lines() -> TestResult {
        let ctx = TestContext::new().await;
        let kenya = ctx.add_product("Kenya AA", 2_000).await;
        let brazil = ctx.add_product("Brazil Santos", 1_500).await;

        let added = ctx.orders.add_item(new_item(JANE, &kenya, 2)).await?;
        let kept = ctx.orders.add_item(new_item(JANE, &brazil, 1)).await?;

        ctx.orders.modify_item(added.uuid, -3).await?;

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uuid, kept.uuid);
        assert_eq!(ctx.stored_orders().await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn modify_item_reprices_from_the_current_unit_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 2)).await?;

        ctx.set_product_price(product.uuid, 2_500).await;

        ctx.orders.modify_item(added.uuid, 5).await?;

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].price, 12_500);

        Ok(())
    }

    #[tokio::test]
    async fn modify_item_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.modify_item(OrderItemUuid::new(), 2).await;

        assert_eq!(result, Err(OrdersServiceError::OrderItemNotFound));
    }

    #[tokio::test]
    async fn modify_item_quantity_out_of_range_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 1)).await?;

        for quantity in [i64::MAX, 3_000_000_000, i64::from(MAX_QUANTITY) + 1] {
            let result = ctx.orders.modify_item(added.uuid, quantity).await;

            assert_eq!(result, Err(OrdersServiceError::InvalidQuantity));
        }

        let items = ctx.stored_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].price, 2_000);

        Ok(())
    }

    #[tokio::test]
    async fn modify_item_store_failure_returns_modify_failed() {
        let mut items = MockOrderItemsRepository::new();
        items
            .expect_find_item()
            .once()
            .return_once(|_| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(MockOrdersRepository::new()),
            Arc::new(items),
        );

        let result = service.modify_item(OrderItemUuid::new(), 2).await;

        assert_eq!(result, Err(OrdersServiceError::ModifyFailed));
    }

    #[tokio::test]
    async fn remove_item_deletes_the_last_line_and_its_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.add_product("Kenya AA", 2_000).await;

        let added = ctx.orders.add_item(new_item(JANE, &product, 2)).await?;

        ctx.orders.remove_item(added.uuid).await?;

        assert!(ctx.stored_items().await.is_empty());
        assert!(ctx.stored_orders().await.is_empty());
        assert_eq!(
            ctx.orders.get_order(JANE).await,
            Err(OrdersServiceError::OrderNotFound)
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_keeps_a_cart_with_other_lines() -> TestResult {
        let ctx = TestContext::new().await;
        let kenya = ctx.add_product("Kenya AA", 2_000).await;
        let brazil = ctx.add_product("Brazil Santos", 1_500).await;

        let removed = ctx.orders.add_item(new_item(JANE, &kenya, 2)).await?;
        ctx.orders.add_item(new_item(JANE, &brazil, 1)).await?;

        ctx.orders.remove_item(removed.uuid).await?;

        let order = ctx.orders.get_order(JANE).await?;
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_name, "Brazil Santos");

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.remove_item(OrderItemUuid::new()).await;

        assert_eq!(result, Err(OrdersServiceError::OrderItemNotFound));
    }

    #[tokio::test]
    async fn remove_item_delete_failure_returns_remove_failed() {
        let order = order_record(JANE, OrderStatus::Pending, Timestamp::now());
        let line = OrderItemRecord {
            uuid: OrderItemUuid::new(),
            order_uuid: order.uuid,
            product_uuid: ProductUuid::new(),
            quantity: 1,
            price: 2_000,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        };
        let item_uuid = line.uuid;

        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_order()
            .once()
            .return_once(move |_| Ok(Some(order)));

        let mut items = MockOrderItemsRepository::new();
        items
            .expect_find_item()
            .times(2)
            .returning(move |_| Ok(Some(line.clone())));
        items
            .expect_delete_item()
            .once()
            .return_once(|_| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(orders),
            Arc::new(items),
        );

        let result = service.remove_item(item_uuid).await;

        assert_eq!(result, Err(OrdersServiceError::RemoveFailed));
    }

    #[tokio::test]
    async fn promote_ready_orders_promotes_only_orders_inside_the_window() -> TestResult {
        let ctx = TestContext::new().await;
        let start: Timestamp = "2026-03-01T14:00:00Z".parse()?;
        let end: Timestamp = "2026-03-02T02:00:00Z".parse()?;

        let before = order_record("a@example.com", OrderStatus::Pending, start - 1.minute());
        let at_start = order_record("b@example.com", OrderStatus::Pending, start);
        let inside = order_record("c@example.com", OrderStatus::Pending, start + 6.hours());
        let at_end = order_record("d@example.com", OrderStatus::Pending, end);

        for order in [&before, &at_start, &inside, &at_end] {
            ctx.insert_order(order).await;
        }

        let report = ctx
            .orders
            .promote_ready_orders(SweepWindow { start, end })
            .await?;

        assert_eq!(report.promoted, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.window_start, start);
        assert_eq!(report.window_end, end);

        let statuses: Vec<_> = ctx
            .stored_orders()
            .await
            .into_iter()
            .map(|order| (order.email, order.status))
            .collect();

        assert_eq!(
            statuses,
            vec![
                ("a@example.com".to_string(), OrderStatus::Pending),
                ("b@example.com".to_string(), OrderStatus::ReadyForDelivery),
                ("c@example.com".to_string(), OrderStatus::ReadyForDelivery),
                ("d@example.com".to_string(), OrderStatus::Pending),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn promote_ready_orders_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let start: Timestamp = "2026-03-01T14:00:00Z".parse()?;
        let end: Timestamp = "2026-03-02T02:00:00Z".parse()?;

        ctx.insert_order(&order_record(JANE, OrderStatus::Pending, start + 1.hour()))
            .await;

        let window = SweepWindow { start, end };

        let first = ctx.orders.promote_ready_orders(window).await?;
        let second = ctx.orders.promote_ready_orders(window).await?;

        assert_eq!(first.promoted, 1);
        assert_eq!(second.promoted, 0);
        assert_eq!(second.failed, 0);

        Ok(())
    }

    #[tokio::test]
    async fn promote_ready_orders_counts_failed_updates() -> TestResult {
        let start: Timestamp = "2026-03-01T14:00:00Z".parse()?;
        let end: Timestamp = "2026-03-02T02:00:00Z".parse()?;
        let found = vec![
            order_record("a@example.com", OrderStatus::Pending, start),
            order_record("b@example.com", OrderStatus::Pending, start + 1.hour()),
            order_record("c@example.com", OrderStatus::Pending, start + 2.hours()),
        ];
        let failing = found[1].uuid;
        let vanished = found[2].uuid;

        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_orders_created_between()
            .once()
            .return_once(move |_, _, _| Ok(found));
        orders
            .expect_update_order_status()
            .times(3)
            .returning(move |uuid, _| {
                if uuid == failing {
                    Err(StoreError::Conflict)
                } else if uuid == vanished {
                    Ok(0)
                } else {
                    Ok(1)
                }
            });

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(orders),
            Arc::new(MockOrderItemsRepository::new()),
        );

        let report = service
            .promote_ready_orders(SweepWindow { start, end })
            .await?;

        assert_eq!(report.promoted, 1);
        assert_eq!(report.failed, 1);

        Ok(())
    }

    #[tokio::test]
    async fn promote_ready_orders_query_failure_returns_sweep_failed() -> TestResult {
        let mut orders = MockOrdersRepository::new();
        orders
            .expect_find_orders_created_between()
            .once()
            .return_once(|_, _, _| Err(StoreError::Conflict));

        let service = StoreOrdersService::new(
            Arc::new(MockProductsRepository::new()),
            Arc::new(orders),
            Arc::new(MockOrderItemsRepository::new()),
        );

        let window = SweepWindow {
            start: "2026-03-01T14:00:00Z".parse()?,
            end: "2026-03-02T02:00:00Z".parse()?,
        };

        let result = service.promote_ready_orders(window).await;

        assert_eq!(result, Err(OrdersServiceError::SweepFailed));

        Ok(())
    }
}
