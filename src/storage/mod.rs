//! Storage implementations.
//!
//! One trait per persisted concern, with a SQL backend (SQLite/PostgreSQL)
//! and an in-memory mock.

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};

mod channel_store;
mod history_store;
mod link_store;
pub mod mock;
pub mod row;
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;
mod trigger_store;

pub use channel_store::ChannelStore;
pub use history_store::TriggerHistoryStore;
pub use link_store::NodeGroupLinkStore;
pub use trigger_store::TriggerStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors from storage operations.
///
/// A lookup that matches nothing is never an error; stores return
/// `Ok(None)` or an empty collection instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid record: column={column}: {reason}")]
    InvalidRecord { column: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Storage type {0:?} is not enabled in this build")]
    Unsupported(StorageType),

    /// Failure of a load whose result several callers waited on.
    #[error(transparent)]
    Shared(Arc<StorageError>),
}

impl StorageError {
    pub(crate) fn invalid(column: &str, reason: impl Into<String>) -> Self {
        StorageError::InvalidRecord {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Handles to every store, all backed by the same database.
#[derive(Clone)]
pub struct Stores {
    pub triggers: Arc<dyn TriggerStore>,
    pub history: Arc<dyn TriggerHistoryStore>,
    pub links: Arc<dyn NodeGroupLinkStore>,
    pub channels: Arc<dyn ChannelStore>,
}

impl Stores {
    /// Use one object for every store trait.
    pub fn from_single<S>(store: Arc<S>) -> Self
    where
        S: TriggerStore + TriggerHistoryStore + NodeGroupLinkStore + ChannelStore + 'static,
    {
        Self {
            triggers: store.clone(),
            history: store.clone(),
            links: store.clone(),
            channels: store,
        }
    }
}

/// Initialize storage based on configuration.
///
/// Connects to the configured backend, creates the schema if missing, and
/// returns handles to every store.
pub async fn init_storage(config: &StorageConfig, catalog_equals_schema: bool) -> Result<Stores> {
    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            info!(path = %config.sqlite.path, "Storage: sqlite");

            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
            }

            let pool = sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(config.sqlite.max_connections)
                .connect(&format!("sqlite:{}?mode=rwc", config.sqlite.path))
                .await?;

            let store = Arc::new(
                sql::sqlite::SqliteConfigStore::new(pool)
                    .with_catalog_equals_schema(catalog_equals_schema),
            );
            store.init_schema().await?;

            Ok(Stores::from_single(store))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            info!(uri = %config.postgres.uri, "Storage: postgres");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.postgres.max_connections)
                .connect(&config.postgres.uri)
                .await?;

            let store = Arc::new(
                sql::postgres::PostgresConfigStore::new(pool)
                    .with_catalog_equals_schema(catalog_equals_schema),
            );
            store.init_schema().await?;

            Ok(Stores::from_single(store))
        }
        #[allow(unreachable_patterns)]
        other => {
            tracing::error!(storage_type = ?other, "Storage backend not enabled");
            Err(StorageError::Unsupported(other))
        }
    }
}
