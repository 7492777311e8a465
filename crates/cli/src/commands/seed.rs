use pricecast_core::config::StoreKind;
use pricecast_core::store::{ProductStore, CATALOG_COLUMNS};
use pricecast_db::{
    connect_with_settings, migrations, DemoCatalog, SqlProductStore, PRODUCTS_TABLE,
};

use crate::commands::{load_config, runtime, CommandResult};

/// Upserts the demo catalog into the configured table. The default `products`
/// table is migrated first; any other table must already carry the catalog columns.
pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    if config.store.kind() != Some(StoreKind::Sqlite) {
        return CommandResult::failure(
            "seed",
            "seed",
            "the demo catalog can only be loaded into a sqlite store",
            7,
        );
    }

    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.store.url,
            config.store.max_connections,
            config.store.timeout_secs,
        )
        .await
        .map_err(|error| ("store_access", error.to_string(), 4u8))?;

        let table = config.store.table.as_str();
        if table == PRODUCTS_TABLE {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), 7u8))?;
        } else {
            let missing = SqlProductStore::new(pool.clone(), table)
                .missing_columns(&CATALOG_COLUMNS)
                .await
                .map_err(|error| ("store_access", error.to_string(), 4u8))?;
            if !missing.is_empty() {
                pool.close().await;
                return Err((
                    "schema_precondition",
                    format!("table `{table}` is missing columns: {}", missing.join(", ")),
                    5u8,
                ));
            }
        }

        let seeded = DemoCatalog::load(&pool, table)
            .await
            .map_err(|error| ("seed", error.to_string(), 7u8))?;
        let present = DemoCatalog::count_present(&pool, table)
            .await
            .map_err(|error| ("seed", error.to_string(), 7u8))?;

        pool.close().await;
        if present < seeded.products_seeded {
            return Err((
                "seed",
                format!("expected {} demo products, found {present}", seeded.products_seeded),
                7u8,
            ));
        }
        Ok::<usize, (&'static str, String, u8)>(seeded.products_seeded)
    });

    match result {
        Ok(count) => {
            CommandResult::success("seed", format!("demo catalog loaded: {count} products"))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
