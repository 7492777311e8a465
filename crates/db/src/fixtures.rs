use pricecast_core::domain::product::ProductRecord;
use pricecast_core::features::season_for_month;
use pricecast_core::store::StoreError;

use crate::connection::DbPool;
use crate::repositories::database_error;

/// Base items of the demo catalog: (id stem, name, category, base price, unit cost).
const DEMO_ITEMS: &[(&str, &str, &str, f64, f64)] = &[
    ("rice", "Basmati Rice 5kg", "Grocery", 640.0, 470.0),
    ("tea", "Assam Tea 500g", "Grocery", 260.0, 150.0),
    ("oil", "Mustard Oil 1L", "Grocery", 185.0, 140.0),
    ("phone", "Budget Smartphone", "Electronics", 9999.0, 7800.0),
    ("earbuds", "Wireless Earbuds", "Electronics", 1499.0, 820.0),
    ("fan", "Table Fan", "Electronics", 2199.0, 1650.0),
    ("kurta", "Cotton Kurta", "Apparel", 799.0, 380.0),
    ("raincoat", "Raincoat", "Apparel", 649.0, 300.0),
    ("shawl", "Wool Shawl", "Apparel", 1199.0, 610.0),
    ("lamp", "Diya Lamp Set", "Home", 349.0, 120.0),
    ("cooler", "Air Cooler", "Home", 6499.0, 5100.0),
    ("blanket", "Fleece Blanket", "Home", 999.0, 560.0),
];

const DEMO_REGIONS: &[&str] = &["North", "South", "East", "West"];

/// Months each base item is sampled in; three snapshots per item.
const DEMO_MONTHS: [u32; 3] = [1, 5, 8];

/// Deterministic sample catalog for local runs against SQLite.
pub struct DemoCatalog;

impl DemoCatalog {
    pub fn records() -> Vec<ProductRecord> {
        let mut records = Vec::with_capacity(DEMO_ITEMS.len() * DEMO_MONTHS.len());

        for (item_index, (stem, name, category, price, cost)) in DEMO_ITEMS.iter().enumerate() {
            for (month_index, month) in DEMO_MONTHS.iter().enumerate() {
                let season = season_for_month(*month);
                let seasonal_boost = match (*category, season.as_str()) {
                    ("Apparel", "Monsoon") | ("Home", "Summer") | ("Electronics", "Summer") => 1.6,
                    ("Apparel", "Winter") | ("Home", "Winter") => 1.4,
                    _ => 1.0,
                };
                let region_index = (item_index + month_index) % DEMO_REGIONS.len();
                let is_festival = *month == 8 || (item_index + month_index) % 5 == 0;
                let is_promo = (item_index + month_index) % 3 == 0;
                let discount_percent = if is_promo { 10.0 } else { 0.0 };
                let demand_score = ((item_index * 7 + month_index * 3) % 10) as f64 / 10.0;
                let base_units = 4.0e4 / price;
                let festival_lift = if is_festival { 1.3 } else { 1.0 };
                let sales_count =
                    (base_units * seasonal_boost * festival_lift * (1.0 + demand_score)).round();

                records.push(ProductRecord {
                    name: Some(name.to_string()),
                    category: Some(category.to_string()),
                    region: Some(DEMO_REGIONS[region_index].to_string()),
                    price: Some(*price),
                    cost_per_unit: Some(*cost),
                    stock_quantity: Some((40 + (item_index * 13 + month_index * 17) % 160) as f64),
                    discount_percent: Some(discount_percent),
                    demand_score: Some(demand_score),
                    sales_count: Some(sales_count),
                    month_num: Some(*month),
                    season: Some(season.as_str().to_string()),
                    is_festival: Some(is_festival),
                    is_promo: Some(is_promo),
                    ..ProductRecord::new(format!("demo-{stem}-{month:02}"))
                });
            }
        }

        records
    }

    /// Upserts the demo catalog into `table`, which needs the catalog columns
    /// and a unique `id`. Re-running refreshes catalog attributes and leaves
    /// forecast and pricing outputs in place.
    pub async fn load(pool: &DbPool, table: &str) -> Result<SeedResult, StoreError> {
        let records = Self::records();
        let sql = format!(
            "INSERT INTO {table} (
                    id, name, category, region, price, cost_per_unit, stock_quantity,
                    discount_percent, demand_score, sales_count, month_num, season,
                    is_festival, is_promo
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    category = excluded.category,
                    region = excluded.region,
                    price = excluded.price,
                    cost_per_unit = excluded.cost_per_unit,
                    stock_quantity = excluded.stock_quantity,
                    discount_percent = excluded.discount_percent,
                    demand_score = excluded.demand_score,
                    sales_count = excluded.sales_count,
                    month_num = excluded.month_num,
                    season = excluded.season,
                    is_festival = excluded.is_festival,
                    is_promo = excluded.is_promo"
        );
        let mut tx = pool.begin().await.map_err(database_error)?;

        for record in &records {
            sqlx::query(&sql)
                .bind(record.id.0.as_str())
                .bind(record.name.as_deref())
                .bind(record.category.as_deref())
                .bind(record.region.as_deref())
                .bind(record.price)
                .bind(record.cost_per_unit)
                .bind(record.stock_quantity)
                .bind(record.discount_percent)
                .bind(record.demand_score)
                .bind(record.sales_count)
                .bind(record.month_num.map(i64::from))
                .bind(record.season.as_deref())
                .bind(record.is_festival.map(i64::from))
                .bind(record.is_promo.map(i64::from))
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;
        Ok(SeedResult { products_seeded: records.len() })
    }

    /// Number of demo rows currently present in `table`.
    pub async fn count_present(pool: &DbPool, table: &str) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(1) FROM {table} WHERE id LIKE 'demo-%'");
        let present: i64 =
            sqlx::query_scalar(&sql).fetch_one(pool).await.map_err(database_error)?;
        Ok(usize::try_from(present).unwrap_or_default())
    }

    pub async fn clean(pool: &DbPool, table: &str) -> Result<(), StoreError> {
        sqlx::query(&format!("DELETE FROM {table} WHERE id LIKE 'demo-%'"))
            .execute(pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub products_seeded: usize,
}
