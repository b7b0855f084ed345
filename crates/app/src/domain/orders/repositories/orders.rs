//! Orders Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    database::{Db, StoreError},
    domain::orders::records::{OrderRecord, OrderStatus, OrderUuid},
};

use super::OrdersRepository;

const FIND_ORDER_SQL: &str = include_str!("../sql/find_order.sql");
const FIND_OPEN_ORDER_BY_EMAIL_SQL: &str = include_str!("../sql/find_open_order_by_email.sql");
const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const DELETE_ORDER_SQL: &str = include_str!("../sql/delete_order.sql");
const FIND_ORDERS_CREATED_BETWEEN_SQL: &str =
    include_str!("../sql/find_orders_created_between.sql");

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn find_open_order(&self, email: &str) -> Result<Option<OrderRecord>, StoreError> {
        let order = query_as::<Postgres, OrderRecord>(FIND_OPEN_ORDER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(order)
    }

    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, StoreError> {
        let order = query_as::<Postgres, OrderRecord>(FIND_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(order)
    }

    async fn create_order(&self, order: &OrderRecord) -> Result<OrderRecord, StoreError> {
        let created = query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(&order.email)
            .bind(&order.address)
            .bind(&order.postcode)
            .bind(order.status.as_str())
            .bind(SqlxTimestamp::from(order.created_at))
            .bind(SqlxTimestamp::from(order.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<u64, StoreError> {
        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_order(&self, order: OrderUuid) -> Result<u64, StoreError> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn find_orders_created_between(
        &self,
        start: Timestamp,
        end: Timestamp,
        excluding: OrderStatus,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = query_as::<Postgres, OrderRecord>(FIND_ORDERS_CREATED_BETWEEN_SQL)
            .bind(SqlxTimestamp::from(start))
            .bind(SqlxTimestamp::from(end))
            .bind(excluding.as_str())
            .fetch_all(self.db.pool())
            .await?;

        Ok(orders)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status = row
            .try_get::<String, _>("status")?
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            postcode: row.try_get("postcode")?,
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::test::{TestContext, order_record};

    use super::*;

    fn repository(ctx: &TestContext) -> PgOrdersRepository {
        PgOrdersRepository::new(Db::new(ctx.db.pool().clone()))
    }

    #[tokio::test]
    async fn create_order_round_trips_status_and_address() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let order = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());

        orders.create_order(&order).await?;

        let found = orders.find_order(order.uuid).await?.ok_or("order not stored")?;

        assert_eq!(found.email, "jane@example.com");
        assert_eq!(found.address, "1 Roastery Lane");
        assert_eq!(found.postcode, "BN1 1AA");
        assert_eq!(found.status, OrderStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn second_open_order_for_an_email_conflicts() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let first = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());
        let second = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());

        orders.create_order(&first).await?;

        let result = orders.create_order(&second).await;

        assert!(
            matches!(result, Err(StoreError::Conflict)),
            "expected Conflict, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn promoted_orders_do_not_block_a_new_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let promoted = order_record(
            "jane@example.com",
            OrderStatus::ReadyForDelivery,
            Timestamp::now(),
        );
        let open = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());

        orders.create_order(&promoted).await?;
        orders.create_order(&open).await?;

        let found = orders.find_open_order("jane@example.com").await?;

        assert_eq!(found.map(|order| order.uuid), Some(open.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn status_update_is_conditional() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let order = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());
        orders.create_order(&order).await?;

        let ready = OrderStatus::ReadyForDelivery;

        assert_eq!(orders.update_order_status(order.uuid, ready).await?, 1);
        assert_eq!(orders.update_order_status(order.uuid, ready).await?, 0);
        assert_eq!(orders.update_order_status(OrderUuid::new(), ready).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn delete_order_reports_rows_removed() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let order = order_record("jane@example.com", OrderStatus::Pending, Timestamp::now());
        orders.create_order(&order).await?;

        assert_eq!(orders.delete_order(order.uuid).await?, 1);
        assert_eq!(orders.delete_order(order.uuid).await?, 0);
        assert!(orders.find_order(order.uuid).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn created_between_is_half_open_and_skips_the_excluded_status() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = repository(&ctx);
        let start: Timestamp = "2026-03-01T14:00:00Z".parse()?;
        let end: Timestamp = "2026-03-02T02:00:00Z".parse()?;

        let later = order_record("b@example.com", OrderStatus::Pending, start + 2.hours());
        let at_start = order_record("a@example.com", OrderStatus::Pending, start);
        let promoted = order_record(
            "c@example.com",
            OrderStatus::ReadyForDelivery,
            start + 1.hour(),
        );
        let at_end = order_record("d@example.com", OrderStatus::Pending, end);

        for order in [&later, &at_start, &promoted, &at_end] {
            orders.create_order(order).await?;
        }

        let found: Vec<_> = orders
            .find_orders_created_between(start, end, OrderStatus::ReadyForDelivery)
            .await?
            .into_iter()
            .map(|order| order.uuid)
            .collect();

        assert_eq!(found, vec![at_start.uuid, later.uuid]);

        Ok(())
    }
}
