pub mod calendar;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod forecast;
pub mod ml;
pub mod pipeline;
pub mod pricing;
pub mod store;

#[cfg(test)]
mod testing;

pub use calendar::CalendarContext;
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat, StoreKind};
pub use domain::product::{ProductId, ProductRecord};
pub use errors::PipelineError;
pub use features::{
    season_for_month, CategoricalEncoder, ContextOverrides, FeatureBuilder, FeatureVector, Season,
};
pub use forecast::{ForecastEngine, UpdateFailure};
pub use ml::{DemandModel, GradientBoostedRegressor, ModelError, ModelMetrics, TrainingProfile};
pub use pipeline::{
    run_forecast, run_optimize, ForecastReport, ForecastSample, PricingReport, RunStatus,
    TrainedDemand,
};
pub use pricing::{PriceOptimizer, PriceRecommendation, Recommendation};
pub use store::{
    ProductStore, ProductUpdate, StoreError, CATALOG_COLUMNS, FORECAST_COLUMNS, PRICING_COLUMNS,
};
