use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::product::{ProductId, ProductRecord};
use crate::features::{FeatureVector, PRICE_INDEX};
use crate::ml::{DemandModel, ModelError};
use crate::store::{ProductStore, ProductUpdate, StoreError};

/// Analytic stand-in for a trained regressor.
pub enum FixedModel {
    PriceCurve { intercept: f64, slope: f64 },
    Column(usize),
}

impl FixedModel {
    pub fn price_curve(intercept: f64, slope: f64) -> Self {
        Self::PriceCurve { intercept, slope }
    }

    pub fn column(index: usize) -> Self {
        Self::Column(index)
    }
}

impl DemandModel for FixedModel {
    fn fit(&mut self, _features: &[FeatureVector], _targets: &[f64]) -> Result<(), ModelError> {
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        Ok(features
            .iter()
            .map(|row| match self {
                Self::PriceCurve { intercept, slope } => intercept + slope * row.get(PRICE_INDEX),
                Self::Column(index) => row.get(*index),
            })
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingStore {
    records: Vec<ProductRecord>,
    missing: Vec<String>,
    failing: HashSet<String>,
    updates: Mutex<Vec<(ProductId, ProductUpdate)>>,
}

impl RecordingStore {
    pub fn with_records(records: Vec<ProductRecord>) -> Self {
        Self { records, ..Self::default() }
    }

    pub fn failing_on(ids: &[&str]) -> Self {
        Self::default().failing(ids)
    }

    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn missing(mut self, columns: &[&str]) -> Self {
        self.missing = columns.iter().map(|column| column.to_string()).collect();
        self
    }

    pub fn updates(&self) -> Vec<(ProductId, ProductUpdate)> {
        self.updates.lock().map(|updates| updates.clone()).unwrap_or_default()
    }

    pub fn update_for(&self, id: &ProductId) -> Option<ProductUpdate> {
        self.updates().into_iter().rev().find(|(seen, _)| seen == id).map(|(_, update)| update)
    }
}

#[async_trait]
impl ProductStore for RecordingStore {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.records.clone())
    }

    async fn missing_columns(&self, required: &[&str]) -> Result<Vec<String>, StoreError> {
        Ok(required
            .iter()
            .filter(|column| self.missing.iter().any(|missing| missing == *column))
            .map(|column| column.to_string())
            .collect())
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), StoreError> {
        if self.failing.contains(&id.0) {
            return Err(StoreError::Rejected { status: 503, body: "write timeout".to_string() });
        }
        self.updates
            .lock()
            .map_err(|_| StoreError::Transport("update log poisoned".to_string()))?
            .push((id.clone(), update.clone()));
        Ok(())
    }
}
