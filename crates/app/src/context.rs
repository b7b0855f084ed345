//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::{
        orders::{OrdersService, PgOrderItemsRepository, PgOrdersRepository, StoreOrdersService},
        products::{PgProductsRepository, ProductsService, StoreProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub orders: Arc<dyn OrdersService>,
    pub products: Arc<dyn ProductsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(url: &str, run_migrations: bool) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;

            info!("database migrations applied");
        }

        Ok(Self::from_db(Db::new(pool)))
    }

    /// Wire the Postgres-backed services over an existing pool.
    #[must_use]
    pub fn from_db(db: Db) -> Self {
        let products = Arc::new(PgProductsRepository::new(db.clone()));

        Self {
            orders: Arc::new(StoreOrdersService::new(
                products.clone(),
                Arc::new(PgOrdersRepository::new(db.clone())),
                Arc::new(PgOrderItemsRepository::new(db)),
            )),
            products: Arc::new(StoreProductsService::new(products)),
        }
    }
}
