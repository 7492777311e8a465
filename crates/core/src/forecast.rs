use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::CalendarContext;
use crate::domain::product::{ProductId, ProductRecord};
use crate::errors::PipelineError;
use crate::features::{FeatureBuilder, FeatureVector};
use crate::ml::{clamp_demand, DemandModel};
use crate::store::{ProductStore, ProductUpdate};

const PROGRESS_EVERY: usize = 10;

/// A per-record write that the store refused; the batch carries on without it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateFailure {
    pub product_id: ProductId,
    pub product_name: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastRun {
    pub total: usize,
    pub updated: usize,
    pub failures: Vec<UpdateFailure>,
    pub predictions: Vec<(ProductId, f64)>,
}

/// Re-contextualises every record to the current month/season and predicts sales.
pub struct ForecastEngine<'a, M: DemandModel + ?Sized> {
    builder: &'a FeatureBuilder,
    model: &'a M,
    context: CalendarContext,
}

impl<'a, M: DemandModel + ?Sized> ForecastEngine<'a, M> {
    pub fn new(builder: &'a FeatureBuilder, model: &'a M, context: CalendarContext) -> Self {
        Self { builder, model, context }
    }

    /// Clamped current-period forecast for one record.
    pub fn forecast(&self, record: &ProductRecord) -> Result<f64, PipelineError> {
        let features = self.builder.build(record, &self.context.overrides())?;
        Ok(clamp_demand(self.model.predict_one(&features)?))
    }

    pub fn forecast_all(&self, records: &[ProductRecord]) -> Result<Vec<f64>, PipelineError> {
        let overrides = self.context.overrides();
        let features = records
            .iter()
            .map(|record| self.builder.build(record, &overrides))
            .collect::<Result<Vec<FeatureVector>, _>>()?;

        Ok(self.model.predict(&features)?.into_iter().map(clamp_demand).collect())
    }

    /// Predicts the whole catalog, then writes `predicted_sales` record by record.
    pub async fn run(
        &self,
        store: &dyn ProductStore,
        records: &[ProductRecord],
    ) -> Result<ForecastRun, PipelineError> {
        let predictions = self.forecast_all(records)?;
        let total = records.len();
        info!(
            event_name = "pipeline.forecast.writing",
            total,
            month = self.context.month,
            season = %self.context.season,
            "updating records with forecasts"
        );

        let mut failures = Vec::new();
        for (position, (record, prediction)) in records.iter().zip(&predictions).enumerate() {
            let update = ProductUpdate::forecast(*prediction);
            if let Err(error) = store.update(&record.id, &update).await {
                warn!(
                    event_name = "pipeline.forecast.update_failed",
                    product_id = %record.id,
                    product_name = record.display_name(),
                    error = %error,
                    "failed to update product forecast"
                );
                failures.push(UpdateFailure {
                    product_id: record.id.clone(),
                    product_name: record.display_name().to_string(),
                    message: error.to_string(),
                });
            }

            if (position + 1) % PROGRESS_EVERY == 0 {
                info!(
                    event_name = "pipeline.forecast.progress",
                    processed = position + 1,
                    total,
                    "forecast progress"
                );
            }
        }

        Ok(ForecastRun {
            total,
            updated: total - failures.len(),
            failures,
            predictions: records.iter().map(|record| record.id.clone()).zip(predictions).collect(),
        })
    }
}
