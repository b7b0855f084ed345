//! Order Items Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    database::{
        Db, StoreError, amount_to_i64, quantity_to_i32, try_get_amount, try_get_quantity,
    },
    domain::{
        orders::records::{OrderItemRecord, OrderItemUuid, OrderUuid},
        products::records::ProductUuid,
    },
};

use super::OrderItemsRepository;

const FIND_ORDER_ITEM_SQL: &str = include_str!("../sql/find_order_item.sql");
const SAVE_ORDER_ITEM_SQL: &str = include_str!("../sql/save_order_item.sql");
const DELETE_ORDER_ITEM_SQL: &str = include_str!("../sql/delete_order_item.sql");
const FIND_ORDER_ITEMS_BY_EMAIL_SQL: &str = include_str!("../sql/find_order_items_by_email.sql");
const FIND_ORDER_ITEMS_BY_ORDER_SQL: &str = include_str!("../sql/find_order_items_by_order.sql");

#[derive(Debug, Clone)]
pub struct PgOrderItemsRepository {
    db: Db,
}

impl PgOrderItemsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderItemsRepository for PgOrderItemsRepository {
    async fn find_item(&self, item: OrderItemUuid) -> Result<Option<OrderItemRecord>, StoreError> {
        let item = query_as::<Postgres, OrderItemRecord>(FIND_ORDER_ITEM_SQL)
            .bind(item.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(item)
    }

    async fn save_item(&self, item: &OrderItemRecord) -> Result<OrderItemRecord, StoreError> {
        let saved = query_as::<Postgres, OrderItemRecord>(SAVE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(item.order_uuid.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(quantity_to_i32(item.quantity, "quantity")?)
            .bind(amount_to_i64(item.price, "price")?)
            .bind(SqlxTimestamp::from(item.created_at))
            .bind(SqlxTimestamp::from(item.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(saved)
    }

    async fn delete_item(&self, item: OrderItemUuid) -> Result<u64, StoreError> {
        let rows_affected = query(DELETE_ORDER_ITEM_SQL)
            .bind(item.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn find_items_by_email(&self, email: &str) -> Result<Vec<OrderItemRecord>, StoreError> {
        let items = query_as::<Postgres, OrderItemRecord>(FIND_ORDER_ITEMS_BY_EMAIL_SQL)
            .bind(email)
            .fetch_all(self.db.pool())
            .await?;

        Ok(items)
    }

    async fn find_items_by_order(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, StoreError> {
        let items = query_as::<Postgres, OrderItemRecord>(FIND_ORDER_ITEMS_BY_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_all(self.db.pool())
            .await?;

        Ok(items)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_quantity(row, "quantity")?,
            price: try_get_amount(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
