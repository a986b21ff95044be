//! Database layer for the airport booking service
//!
//! Provides:
//! - SeaORM entity models
//! - Write payloads for every entity
//! - Repository pattern for data access
//! - Connection pool management and the transaction scope

pub mod inputs;
pub mod models;
pub mod schema;
mod repository;

pub use repository::{
    AirplaneRecord, AirportFilter, AirportRecord, FlightFilter, FlightRecord, OrderRecord,
    Repository, RouteRecord,
};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction,
    TransactionError, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        if config.auto_migrate {
            schema::create_schema(&conn).await?;
        }

        info!("Database connection established");

        Ok(Self { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Run `work` inside one transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back on
    /// `Err`; a transaction dropped mid-flight is rolled back as well.
    pub async fn atomic<F, T>(&self, work: F) -> Result<T>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>
            + Send,
        T: Send,
    {
        self.conn
            .transaction::<F, T, AppError>(work)
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => match AppError::from(err) {
                    AppError::Database(err) => AppError::Transaction {
                        message: err.to_string(),
                    },
                    other => other,
                },
                TransactionError::Transaction(err) => err,
            })
    }
}
