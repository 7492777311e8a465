use std::sync::Arc;

use tracing::info;

use pricecast_core::config::{StoreConfig, StoreKind};
use pricecast_core::store::{ProductStore, StoreError};

pub mod memory;
pub mod rest;
pub mod sql;

pub use memory::InMemoryProductStore;
pub use rest::RestProductStore;
pub use sql::SqlProductStore;

use crate::connect_with_settings;

pub(crate) fn database_error(error: sqlx::Error) -> StoreError {
    StoreError::Database(error.to_string())
}

/// Opens the product store the configured url points at.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ProductStore>, StoreError> {
    match config.kind() {
        Some(StoreKind::Sqlite) => {
            let pool =
                connect_with_settings(&config.url, config.max_connections, config.timeout_secs)
                    .await
                    .map_err(database_error)?;
            info!(
                event_name = "store.opened",
                backend = "sqlite",
                table = %config.table,
                "product store ready"
            );
            Ok(Arc::new(SqlProductStore::new(pool, config.table.clone())))
        }
        Some(StoreKind::Rest) => {
            let store = RestProductStore::new(config)?;
            info!(
                event_name = "store.opened",
                backend = "rest",
                table = %config.table,
                "product store ready"
            );
            Ok(Arc::new(store))
        }
        None => Err(StoreError::Unsupported(format!(
            "store url `{}` is neither sqlite nor http(s)",
            config.url
        ))),
    }
}
