//! Products Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    database::{Db, StoreError, try_get_amount},
    domain::products::records::{ProductRecord, ProductUuid},
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");

/// Product lookup collaborator.
#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Resolve a product by identity; `None` when it does not exist.
    async fn get_product(&self, product: ProductUuid) -> Result<Option<ProductRecord>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgProductsRepository {
    db: Db,
}

impl PgProductsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductsRepository for PgProductsRepository {
    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let product = query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(product)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
