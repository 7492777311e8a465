use std::collections::HashSet;

use tokio::sync::RwLock;

use pricecast_core::domain::product::{ProductId, ProductRecord};
use pricecast_core::store::{
    ProductStore, ProductUpdate, StoreError, CATALOG_COLUMNS, FORECAST_COLUMNS, PRICING_COLUMNS,
};

/// Catalog held in memory. Every pipeline column exists unless narrowed with
/// [`InMemoryProductStore::with_columns`].
pub struct InMemoryProductStore {
    products: RwLock<Vec<ProductRecord>>,
    columns: HashSet<String>,
    failing: HashSet<String>,
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryProductStore {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        let columns = CATALOG_COLUMNS
            .iter()
            .chain(&FORECAST_COLUMNS)
            .chain(&PRICING_COLUMNS)
            .map(|column| column.to_string())
            .collect();
        Self { products: RwLock::new(products), columns, failing: HashSet::new() }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|column| column.to_string()).collect();
        self
    }

    /// Updates for these ids are rejected as if the backend timed out.
    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub async fn snapshot(&self) -> Vec<ProductRecord> {
        self.products.read().await.clone()
    }

    pub async fn find(&self, id: &ProductId) -> Option<ProductRecord> {
        self.products.read().await.iter().find(|record| &record.id == id).cloned()
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.snapshot().await)
    }

    async fn missing_columns(&self, required: &[&str]) -> Result<Vec<String>, StoreError> {
        Ok(required
            .iter()
            .filter(|column| !self.columns.contains(**column))
            .map(|column| column.to_string())
            .collect())
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), StoreError> {
        if self.failing.contains(&id.0) {
            return Err(StoreError::Rejected { status: 504, body: "upstream timeout".to_string() });
        }

        let mut products = self.products.write().await;
        let record = products
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if let Some(predicted_sales) = update.predicted_sales {
            record.predicted_sales = Some(predicted_sales);
        }
        if let Some(suggested_price) = update.suggested_price {
            record.suggested_price = Some(suggested_price);
        }
        if let Some(pricing_reason) = &update.pricing_reason {
            record.pricing_reason = Some(pricing_reason.clone());
        }
        Ok(())
    }
}
