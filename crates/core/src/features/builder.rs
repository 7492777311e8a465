use thiserror::Error;

use crate::domain::product::ProductRecord;

use super::encoder::{CategoricalEncoder, EncodingError, UNKNOWN_CATEGORY};
use super::season::{season_for_month, Season};

pub const FEATURE_COUNT: usize = 11;

/// Column order shared by training and every inference pass.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "price",
    "cost_per_unit",
    "stock_quantity",
    "demand_score",
    "category",
    "season",
    "region",
    "month_num",
    "is_festival",
    "is_promo",
    "discount_percent",
];

pub const PRICE_INDEX: usize = 0;
pub const SEASON_INDEX: usize = 5;
pub const MONTH_INDEX: usize = 7;

const DEFAULT_MONTH: u32 = 1;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Forced replacements applied on top of a record's stored context.
///
/// Overriding the month without a season re-derives the season from the new month.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContextOverrides {
    pub month_num: Option<u32>,
    pub season: Option<Season>,
    pub price: Option<f64>,
}

impl ContextOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn calendar(month_num: u32, season: Season) -> Self {
        Self { month_num: Some(month_num), season: Some(season), price: None }
    }

    pub fn with_price(self, price: f64) -> Self {
        Self { price: Some(price), ..self }
    }
}

/// A record after default resolution: no optional fields remain.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRecord {
    pub price: f64,
    pub cost_per_unit: f64,
    pub stock_quantity: f64,
    pub demand_score: f64,
    pub category: String,
    pub season: String,
    pub region: String,
    pub month_num: u32,
    pub is_festival: bool,
    pub is_promo: bool,
    pub discount_percent: f64,
}

impl ResolvedRecord {
    pub fn resolve(record: &ProductRecord) -> Self {
        let month_num = record.month_num.unwrap_or(DEFAULT_MONTH);
        let season = record
            .season
            .as_deref()
            .filter(|season| *season != UNKNOWN_CATEGORY)
            .map(str::to_string)
            .unwrap_or_else(|| season_for_month(month_num).as_str().to_string());

        Self {
            price: record.price.unwrap_or(0.0),
            cost_per_unit: record.cost_per_unit.unwrap_or(0.0),
            stock_quantity: record.stock_quantity.unwrap_or(0.0),
            demand_score: record.demand_score.unwrap_or(0.0),
            category: record.category.clone().unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            season,
            region: record.region.clone().unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            month_num,
            is_festival: record.is_festival.unwrap_or(false),
            is_promo: record.is_promo.unwrap_or(false),
            discount_percent: record.discount_percent.unwrap_or(0.0),
        }
    }

    pub fn apply(mut self, overrides: &ContextOverrides) -> Self {
        if let Some(month_num) = overrides.month_num {
            self.month_num = month_num;
            self.season = season_for_month(month_num).as_str().to_string();
        }
        if let Some(season) = overrides.season {
            self.season = season.as_str().to_string();
        }
        if let Some(price) = overrides.price {
            self.price = price;
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureEncoders {
    pub category: CategoricalEncoder,
    pub season: CategoricalEncoder,
    pub region: CategoricalEncoder,
}

impl FeatureEncoders {
    pub fn fit(resolved: &[ResolvedRecord]) -> Self {
        Self {
            category: CategoricalEncoder::fit_with_unknown(
                "category",
                resolved.iter().map(|record| record.category.as_str()),
            ),
            season: CategoricalEncoder::fit_season(
                "season",
                resolved.iter().map(|record| record.season.as_str()),
            ),
            region: CategoricalEncoder::fit_with_unknown(
                "region",
                resolved.iter().map(|record| record.region.as_str()),
            ),
        }
    }
}

/// Turns catalog records into model inputs using encoders fitted on one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureBuilder {
    encoders: FeatureEncoders,
}

impl FeatureBuilder {
    pub fn fit(records: &[ProductRecord]) -> Self {
        let resolved: Vec<ResolvedRecord> = records.iter().map(ResolvedRecord::resolve).collect();
        Self { encoders: FeatureEncoders::fit(&resolved) }
    }

    pub fn encoders(&self) -> &FeatureEncoders {
        &self.encoders
    }

    /// Resolves defaults, applies `overrides`, then encodes in `FEATURE_NAMES` order.
    pub fn build(
        &self,
        record: &ProductRecord,
        overrides: &ContextOverrides,
    ) -> Result<FeatureVector, FeatureError> {
        self.encode(&ResolvedRecord::resolve(record).apply(overrides))
    }

    pub fn encode(&self, resolved: &ResolvedRecord) -> Result<FeatureVector, FeatureError> {
        let category = self.encoders.category.transform_or_unknown(&resolved.category)?;
        let season = self.encoders.season.transform_or_unknown(&resolved.season)?;
        let region = self.encoders.region.transform_or_unknown(&resolved.region)?;

        Ok(FeatureVector([
            resolved.price,
            resolved.cost_per_unit,
            resolved.stock_quantity,
            resolved.demand_score,
            f64::from(category),
            f64::from(season),
            f64::from(region),
            f64::from(resolved.month_num),
            if resolved.is_festival { 1.0 } else { 0.0 },
            if resolved.is_promo { 1.0 } else { 0.0 },
            resolved.discount_percent,
        ]))
    }
}
