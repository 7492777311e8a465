pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool};
pub use fixtures::{DemoCatalog, SeedResult};
pub use migrations::PRODUCTS_TABLE;
pub use repositories::{open_store, InMemoryProductStore, RestProductStore, SqlProductStore};
