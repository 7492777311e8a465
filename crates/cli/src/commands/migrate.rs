use pricecast_core::config::StoreKind;
use pricecast_db::{connect_with_settings, migrations, PRODUCTS_TABLE};

use crate::commands::{load_config, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    if config.store.kind() != Some(StoreKind::Sqlite) {
        return CommandResult::failure(
            "migrate",
            "migration",
            "migrations only apply to sqlite stores; manage the REST product table on its host",
            7,
        );
    }

    if config.store.table != PRODUCTS_TABLE {
        return CommandResult::failure(
            "migrate",
            "config_validation",
            format!(
                "migrations manage the `{PRODUCTS_TABLE}` table, but store.table is `{}`; \
                 create that table yourself or unset PRICECAST_STORE_TABLE",
                config.store.table
            ),
            2,
        );
    }

    let runtime = match runtime("migrate") {
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
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 7u8))?;
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
