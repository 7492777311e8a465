use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tokio::sync::OnceCell;

use pricecast_core::domain::product::{ProductId, ProductRecord};
use pricecast_core::store::{ProductStore, ProductUpdate, StoreError, CATALOG_COLUMNS};

use super::database_error;
use crate::DbPool;

pub struct SqlProductStore {
    pool: DbPool,
    table: String,
    tracks_updated_at: OnceCell<bool>,
}

impl SqlProductStore {
    /// `table` must already be validated as a plain identifier; it is
    /// interpolated into statements.
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into(), tracks_updated_at: OnceCell::new() }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Column names of the table; empty when the table does not exist.
    async fn table_columns(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query(&format!("PRAGMA table_info({})", self.table))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<_, _>>()
            .map_err(|error| StoreError::Decode(error.to_string()))
    }

    /// Absent catalog columns are selected as NULL so their fields fall back
    /// to defaults. Only `id` is mandatory.
    fn select_sql(&self, present: &[String]) -> Result<String, StoreError> {
        let has = |column: &str| present.iter().any(|name| name == column);
        if !has("id") {
            return Err(StoreError::Database(format!(
                "table `{}` does not exist or has no `id` column",
                self.table
            )));
        }

        let columns = CATALOG_COLUMNS
            .iter()
            .map(|column| match *column {
                "id" => "CAST(id AS TEXT) AS id".to_string(),
                other if has(other) => other.to_string(),
                other => format!("NULL AS {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("SELECT {columns} FROM {} ORDER BY rowid", self.table))
    }

    async fn tracks_updated_at(&self) -> Result<bool, StoreError> {
        self.tracks_updated_at
            .get_or_try_init(|| async {
                let columns = self.table_columns().await?;
                Ok::<bool, StoreError>(columns.iter().any(|name| name == "updated_at"))
            })
            .await
            .copied()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ProductRecord, sqlx::Error> {
    let month_num: Option<i64> = row.try_get("month_num")?;
    let is_festival: Option<i64> = row.try_get("is_festival")?;
    let is_promo: Option<i64> = row.try_get("is_promo")?;

    Ok(ProductRecord {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        region: row.try_get("region")?,
        price: row.try_get("price")?,
        cost_per_unit: row.try_get("cost_per_unit")?,
        stock_quantity: row.try_get("stock_quantity")?,
        discount_percent: row.try_get("discount_percent")?,
        demand_score: row.try_get("demand_score")?,
        sales_count: row.try_get("sales_count")?,
        month_num: month_num.and_then(|month| u32::try_from(month).ok()),
        season: row.try_get("season")?,
        is_festival: is_festival.map(|flag| flag != 0),
        is_promo: is_promo.map(|flag| flag != 0),
        ..ProductRecord::default()
    })
}

#[async_trait::async_trait]
impl ProductStore for SqlProductStore {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let sql = self.select_sql(&self.table_columns().await?)?;
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(database_error)?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| StoreError::Decode(error.to_string()))
    }

    async fn missing_columns(&self, required: &[&str]) -> Result<Vec<String>, StoreError> {
        let present = self.table_columns().await?;

        Ok(required
            .iter()
            .filter(|column| !present.iter().any(|name| name == *column))
            .map(|column| column.to_string())
            .collect())
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut assignments = Vec::new();
        if update.predicted_sales.is_some() {
            assignments.push("predicted_sales = ?");
        }
        if update.suggested_price.is_some() {
            assignments.push("suggested_price = ?");
        }
        if update.pricing_reason.is_some() {
            assignments.push("pricing_reason = ?");
        }
        if self.tracks_updated_at().await? {
            assignments.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
        }
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, assignments.join(", "));

        let mut query = sqlx::query(&sql);
        if let Some(predicted_sales) = update.predicted_sales {
            query = query.bind(predicted_sales);
        }
        if let Some(suggested_price) = update.suggested_price {
            query = query.bind(suggested_price);
        }
        if let Some(pricing_reason) = &update.pricing_reason {
            query = query.bind(pricing_reason.as_str());
        }

        let result = query.bind(id.0.as_str()).execute(&self.pool).await.map_err(database_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
