use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::product::{ProductId, ProductRecord};

/// Columns read from every catalog row.
pub const CATALOG_COLUMNS: [&str; 14] = [
    "id",
    "name",
    "category",
    "region",
    "price",
    "cost_per_unit",
    "stock_quantity",
    "discount_percent",
    "demand_score",
    "sales_count",
    "month_num",
    "season",
    "is_festival",
    "is_promo",
];

/// Column the forecast flow writes.
pub const FORECAST_COLUMNS: [&str; 1] = ["predicted_sales"];

/// Columns the pricing flow writes; checked before any optimisation work.
pub const PRICING_COLUMNS: [&str; 2] = ["suggested_price", "pricing_reason"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport failure: {0}")]
    Transport(String),
    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("store decode error: {0}")]
    Decode(String),
    #[error("product `{0}` was not found in the store")]
    NotFound(ProductId),
    #[error("database error: {0}")]
    Database(String),
    #[error("operation not supported by this store: {0}")]
    Unsupported(String),
}

/// Field subset written back for one product; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_sales: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_reason: Option<String>,
}

impl ProductUpdate {
    pub fn forecast(predicted_sales: f64) -> Self {
        Self { predicted_sales: Some(predicted_sales), ..Self::default() }
    }

    pub fn pricing(suggested_price: f64, pricing_reason: impl Into<String>) -> Self {
        Self {
            suggested_price: Some(suggested_price),
            pricing_reason: Some(pricing_reason.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicted_sales.is_none()
            && self.suggested_price.is_none()
            && self.pricing_reason.is_none()
    }
}

/// Product table keyed by `id`: bulk read plus point updates.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Returns the subset of `required` the store's schema lacks. Stores that
    /// cannot inspect their schema report nothing missing.
    async fn missing_columns(&self, required: &[&str]) -> Result<Vec<String>, StoreError>;

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), StoreError>;
}
