//! End-to-end forecast and optimize flows over a [`ProductStore`].
//!
//! Each run re-fits the encoders and the regressor from the current catalog
//! snapshot; nothing is persisted between runs except the written fields.

use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::CalendarContext;
use crate::config::PricingConfig;
use crate::domain::product::ProductRecord;
use crate::errors::PipelineError;
use crate::features::{ContextOverrides, FeatureBuilder, FeatureVector, Season};
use crate::forecast::{ForecastEngine, UpdateFailure};
use crate::ml::{train_with_holdout, GradientBoostedRegressor, ModelMetrics, TrainingProfile};
use crate::pricing::PriceOptimizer;
use crate::store::{ProductStore, PRICING_COLUMNS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Partial,
}

impl RunStatus {
    fn from_failures(failures: &[UpdateFailure]) -> Self {
        if failures.is_empty() {
            Self::Ok
        } else {
            Self::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Partial => "partial",
        }
    }
}

/// Encoders plus a regressor fitted on one catalog snapshot.
pub struct TrainedDemand {
    builder: FeatureBuilder,
    model: GradientBoostedRegressor,
    metrics: ModelMetrics,
}

impl TrainedDemand {
    /// Trains on every record with `sales_count` (absent counts as zero) as the target.
    pub fn train(
        records: &[ProductRecord],
        profile: &TrainingProfile,
    ) -> Result<Self, PipelineError> {
        let builder = FeatureBuilder::fit(records);
        let features = records
            .iter()
            .map(|record| builder.build(record, &ContextOverrides::none()))
            .collect::<Result<Vec<FeatureVector>, _>>()?;
        let targets: Vec<f64> =
            records.iter().map(|record| record.sales_count.unwrap_or(0.0)).collect();

        let mut model = GradientBoostedRegressor::new(profile.model.clone());
        let metrics = train_with_holdout(&mut model, &features, &targets, profile)?;
        info!(
            event_name = "model.trained",
            train_samples = metrics.train_samples,
            test_samples = metrics.test_samples,
            mse = metrics.mse,
            r2 = metrics.r2,
            trees = model.trees().len(),
            "demand model trained"
        );

        Ok(Self { builder, model, metrics })
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn model(&self) -> &GradientBoostedRegressor {
        &self.model
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }
}

/// Diagnostic forecast for the first catalog record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastSample {
    pub product_name: String,
    pub month_name: String,
    pub season: Season,
    pub predicted_sales: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastReport {
    pub month: u32,
    pub season: Season,
    pub total: usize,
    pub updated: usize,
    pub failures: Vec<UpdateFailure>,
    pub metrics: Option<ModelMetrics>,
    pub sample: Option<ForecastSample>,
}

impl ForecastReport {
    fn empty(context: CalendarContext) -> Self {
        Self {
            month: context.month,
            season: context.season,
            total: 0,
            updated: 0,
            failures: Vec::new(),
            metrics: None,
            sample: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::from_failures(&self.failures)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricingReport {
    pub month: u32,
    pub season: Season,
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<UpdateFailure>,
    pub raised: usize,
    pub discounted: usize,
    pub held: usize,
    pub metrics: Option<ModelMetrics>,
}

impl PricingReport {
    fn empty(context: CalendarContext) -> Self {
        Self {
            month: context.month,
            season: context.season,
            total: 0,
            updated: 0,
            skipped: 0,
            failures: Vec::new(),
            raised: 0,
            discounted: 0,
            held: 0,
            metrics: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::from_failures(&self.failures)
    }
}

/// Reads the catalog, trains, and writes `predicted_sales` for every product
/// under `context`'s month and season.
pub async fn run_forecast(
    store: &dyn ProductStore,
    context: CalendarContext,
) -> Result<ForecastReport, PipelineError> {
    info!(
        event_name = "pipeline.forecast.started",
        month = context.month,
        season = %context.season,
        "starting demand forecast"
    );

    let records = store.fetch_all().await?;
    if records.is_empty() {
        warn!(
            event_name = "pipeline.forecast.empty_catalog",
            "no products found; nothing to forecast"
        );
        return Ok(ForecastReport::empty(context));
    }
    info!(event_name = "pipeline.forecast.loaded", records = records.len(), "catalog loaded");

    let trained = TrainedDemand::train(&records, &TrainingProfile::forecast())?;
    let engine = ForecastEngine::new(trained.builder(), trained.model(), context);
    let run = engine.run(store, &records).await?;

    let sample = match records.first() {
        Some(first) => {
            let sample = ForecastSample {
                product_name: first.display_name().to_string(),
                month_name: context.month_name().to_string(),
                season: context.season,
                predicted_sales: engine.forecast(first)?,
            };
            info!(
                event_name = "pipeline.forecast.sample",
                product_name = %sample.product_name,
                month = %sample.month_name,
                season = %sample.season,
                predicted_sales = sample.predicted_sales,
                "sample forecast"
            );
            Some(sample)
        }
        None => None,
    };

    info!(
        event_name = "pipeline.forecast.completed",
        total = run.total,
        updated = run.updated,
        failed = run.failures.len(),
        "forecast run completed"
    );

    Ok(ForecastReport {
        month: context.month,
        season: context.season,
        total: run.total,
        updated: run.updated,
        failures: run.failures,
        metrics: Some(trained.metrics().clone()),
        sample,
    })
}

/// Checks the pricing columns exist, trains, and writes a suggested price and
/// reason for every product with a positive current price.
pub async fn run_optimize(
    store: &dyn ProductStore,
    context: CalendarContext,
    pricing: &PricingConfig,
) -> Result<PricingReport, PipelineError> {
    info!(
        event_name = "pipeline.optimize.started",
        month = context.month,
        season = %context.season,
        "starting price optimization"
    );

    let missing = store.missing_columns(&PRICING_COLUMNS).await?;
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns(missing));
    }

    let records = store.fetch_all().await?;
    if records.is_empty() {
        warn!(
            event_name = "pipeline.optimize.empty_catalog",
            "no products found; nothing to price"
        );
        return Ok(PricingReport::empty(context));
    }
    info!(event_name = "pipeline.optimize.loaded", records = records.len(), "catalog loaded");

    let trained = TrainedDemand::train(&records, &TrainingProfile::pricing())?;
    let optimizer = PriceOptimizer::new(
        trained.builder(),
        trained.model(),
        context,
        pricing.currency_symbol.clone(),
    );
    let run = optimizer.run(store, &records).await?;

    info!(
        event_name = "pipeline.optimize.completed",
        total = run.total,
        updated = run.updated,
        skipped = run.skipped,
        failed = run.failures.len(),
        raised = run.raised,
        discounted = run.discounted,
        held = run.held,
        "price optimization completed"
    );

    Ok(PricingReport {
        month: context.month,
        season: context.season,
        total: run.total,
        updated: run.updated,
        skipped: run.skipped,
        failures: run.failures,
        raised: run.raised,
        discounted: run.discounted,
        held: run.held,
        metrics: Some(trained.metrics().clone()),
    })
}

#[cfg(test)]
mod tests {
    use crate::calendar::CalendarContext;
    use crate::config::PricingConfig;
    use crate::domain::product::{ProductId, ProductRecord};
    use crate::errors::PipelineError;
    use crate::ml::TrainingProfile;
    use crate::testing::RecordingStore;

    use super::{run_forecast, run_optimize, RunStatus, TrainedDemand};

    fn catalog() -> Vec<ProductRecord> {
        let categories = ["Grocery", "Electronics", "Apparel"];
        let regions = ["North", "South"];
        (0..24)
            .map(|index| {
                let price = 20.0 + 5.0 * index as f64;
                let month = (index % 12) as u32 + 1;
                ProductRecord {
                    name: Some(format!("Product {index}")),
                    category: Some(categories[index % categories.len()].to_string()),
                    region: Some(regions[index % regions.len()].to_string()),
                    price: Some(price),
                    cost_per_unit: Some(price * 0.6),
                    stock_quantity: Some(100.0 + index as f64),
                    demand_score: Some((index % 10) as f64 / 10.0),
                    sales_count: Some(200.0 - price),
                    month_num: Some(month),
                    is_festival: Some(index % 4 == 0),
                    is_promo: Some(index % 3 == 0),
                    discount_percent: Some((index % 5) as f64),
                    ..ProductRecord::new(format!("p-{index}"))
                }
            })
            .collect()
    }

    fn pricing() -> PricingConfig {
        PricingConfig { currency_symbol: "₹".to_string() }
    }

    #[test]
    fn training_reports_holdout_metrics() {
        let trained =
            TrainedDemand::train(&catalog(), &TrainingProfile::forecast()).expect("train");

        let metrics = trained.metrics();
        assert_eq!(metrics.train_samples + metrics.test_samples, 24);
        assert_eq!(metrics.test_samples, 5);
        assert!(metrics.mse.is_finite());
        assert!(!trained.model().trees().is_empty());
    }

    #[test]
    fn training_on_empty_catalog_is_a_model_error() {
        let error = TrainedDemand::train(&[], &TrainingProfile::pricing())
            .err()
            .expect("empty catalog cannot train");

        assert!(matches!(error, PipelineError::Model(_)));
    }

    #[tokio::test]
    async fn forecast_writes_every_product_and_samples_the_first() {
        let store = RecordingStore::with_records(catalog());

        let report = run_forecast(&store, CalendarContext::for_month(8)).await.expect("forecast");

        assert_eq!(report.total, 24);
        assert_eq!(report.updated, 24);
        assert_eq!(report.status(), RunStatus::Ok);
        assert_eq!(store.updates().len(), 24);
        assert!(store
            .updates()
            .iter()
            .all(|(_, update)| update.predicted_sales.is_some_and(|sales| sales >= 0.0)));

        let sample = report.sample.expect("sample");
        assert_eq!(sample.product_name, "Product 0");
        assert_eq!(sample.month_name, "August");
        let written = store
            .update_for(&ProductId("p-0".to_string()))
            .and_then(|update| update.predicted_sales);
        assert_eq!(Some(sample.predicted_sales), written);
    }

    #[tokio::test]
    async fn forecast_is_idempotent_for_unchanged_catalog() {
        let first = RecordingStore::with_records(catalog());
        let second = RecordingStore::with_records(catalog());

        run_forecast(&first, CalendarContext::for_month(3)).await.expect("first run");
        run_forecast(&second, CalendarContext::for_month(3)).await.expect("second run");

        assert_eq!(first.updates(), second.updates());
    }

    #[tokio::test]
    async fn empty_catalog_finishes_cleanly() {
        let store = RecordingStore::default();

        let forecast = run_forecast(&store, CalendarContext::for_month(1)).await.expect("forecast");
        let pricing =
            run_optimize(&store, CalendarContext::for_month(1), &pricing()).await.expect("pricing");

        assert_eq!((forecast.total, forecast.status()), (0, RunStatus::Ok));
        assert_eq!((pricing.total, pricing.status()), (0, RunStatus::Ok));
        assert!(forecast.metrics.is_none());
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn optimize_aborts_before_reading_when_columns_are_missing() {
        let store = RecordingStore::with_records(catalog()).missing(&["pricing_reason"]);

        let error = run_optimize(&store, CalendarContext::for_month(6), &pricing())
            .await
            .err()
            .expect("missing columns");

        match error {
            PipelineError::MissingColumns(columns) => assert_eq!(columns, vec!["pricing_reason"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn optimize_suggests_prices_within_bounds() {
        let records = catalog();
        let store = RecordingStore::with_records(records.clone());

        let report =
            run_optimize(&store, CalendarContext::for_month(6), &pricing()).await.expect("pricing");

        assert_eq!(report.updated, 24);
        assert_eq!(report.raised + report.discounted + report.held, 24);
        for record in &records {
            let update = store.update_for(&record.id).expect("suggestion written");
            let price = record.price.unwrap_or_default();
            let cost = record.cost_per_unit.unwrap_or_default();
            let suggested = update.suggested_price.expect("suggested price");
            let floor = (cost * 1.05).max(price * 0.7);
            assert!(suggested >= floor - 1e-9 && suggested <= price * 1.5 + 1e-9);
            assert!(update.pricing_reason.is_some_and(|reason| reason.contains('₹')));
        }
    }

    #[tokio::test]
    async fn failed_writes_make_the_run_partial() {
        let mut records = catalog();
        records.truncate(6);
        let store = RecordingStore::with_records(records).failing(&["p-2"]);

        let report = run_forecast(&store, CalendarContext::for_month(11)).await.expect("forecast");

        assert_eq!(report.status(), RunStatus::Partial);
        assert_eq!(report.updated, 5);
        assert_eq!(report.failures[0].product_name, "Product 2");
    }
}
