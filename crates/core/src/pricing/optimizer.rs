use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::CalendarContext;
use crate::domain::product::{ProductId, ProductRecord};
use crate::errors::PipelineError;
use crate::features::FeatureBuilder;
use crate::forecast::UpdateFailure;
use crate::ml::{clamp_demand, DemandModel};
use crate::store::{ProductStore, ProductUpdate};

use super::candidates::PriceBounds;
use super::reason::{change_pct, Recommendation};

const PROGRESS_EVERY: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricePoint {
    pub price: f64,
    pub demand: f64,
    pub profit: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRecommendation {
    pub product_id: ProductId,
    pub current_price: f64,
    pub suggested_price: f64,
    pub predicted_demand: f64,
    pub expected_profit: f64,
    pub change_pct: f64,
    pub recommendation: Recommendation,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PricingRun {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub raised: usize,
    pub discounted: usize,
    pub held: usize,
    pub failures: Vec<UpdateFailure>,
}

/// Picks the first point with strictly greatest profit. Candidates arrive in
/// increasing price order, so ties resolve to the lowest price.
pub fn select_best(points: &[PricePoint]) -> Option<&PricePoint> {
    let mut best: Option<&PricePoint> = None;
    for point in points {
        if best.map_or(true, |current| point.profit > current.profit) {
            best = Some(point);
        }
    }
    best
}

/// Searches a bounded price grid for the profit-maximising price of each product.
pub struct PriceOptimizer<'a, M: DemandModel + ?Sized> {
    builder: &'a FeatureBuilder,
    model: &'a M,
    context: CalendarContext,
    currency_symbol: String,
}

impl<'a, M: DemandModel + ?Sized> PriceOptimizer<'a, M> {
    pub fn new(
        builder: &'a FeatureBuilder,
        model: &'a M,
        context: CalendarContext,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self { builder, model, context, currency_symbol: currency_symbol.into() }
    }

    /// Predicted demand and profit at every candidate price, in candidate order.
    pub fn profit_surface(&self, record: &ProductRecord) -> Result<Vec<PricePoint>, PipelineError> {
        let cost = record.cost_per_unit.unwrap_or(0.0);
        let current_price = record.price.unwrap_or(0.0);
        let baseline = self.context.overrides();

        PriceBounds::for_product(cost, current_price)
            .candidates()
            .into_iter()
            .map(|price| {
                let features = self.builder.build(record, &baseline.with_price(price))?;
                let demand = clamp_demand(self.model.predict_one(&features)?);
                Ok(PricePoint { price, demand, profit: (price - cost) * demand })
            })
            .collect()
    }

    /// `None` for products without a positive current price, which have no
    /// meaningful relative change.
    pub fn optimize(
        &self,
        record: &ProductRecord,
    ) -> Result<Option<PriceRecommendation>, PipelineError> {
        let current_price = match record.price {
            Some(price) if price > 0.0 => price,
            _ => return Ok(None),
        };

        let surface = self.profit_surface(record)?;
        let Some(best) = select_best(&surface) else {
            return Ok(None);
        };

        let change_pct = change_pct(best.price, current_price);
        let recommendation = Recommendation::classify(change_pct);
        let reason = recommendation.reason(best.demand, best.price, &self.currency_symbol);

        Ok(Some(PriceRecommendation {
            product_id: record.id.clone(),
            current_price,
            suggested_price: best.price,
            predicted_demand: best.demand,
            expected_profit: best.profit,
            change_pct,
            recommendation,
            reason,
        }))
    }

    pub async fn run(
        &self,
        store: &dyn ProductStore,
        records: &[ProductRecord],
    ) -> Result<PricingRun, PipelineError> {
        let mut run = PricingRun { total: records.len(), ..PricingRun::default() };

        for (position, record) in records.iter().enumerate() {
            match self.optimize(record)? {
                None => {
                    warn!(
                        event_name = "pipeline.optimize.skipped",
                        product_id = %record.id,
                        product_name = record.display_name(),
                        "skipping product without a positive current price"
                    );
                    run.skipped += 1;
                }
                Some(suggestion) => {
                    debug!(
                        event_name = "pipeline.optimize.suggestion",
                        product_id = %record.id,
                        suggested_price = suggestion.suggested_price,
                        change_pct = suggestion.change_pct,
                        recommendation = suggestion.recommendation.as_str(),
                        "price suggestion computed"
                    );
                    let update =
                        ProductUpdate::pricing(suggestion.suggested_price, suggestion.reason);
                    match store.update(&record.id, &update).await {
                        Ok(()) => {
                            run.updated += 1;
                            match suggestion.recommendation {
                                Recommendation::Raise => run.raised += 1,
                                Recommendation::Discount => run.discounted += 1,
                                Recommendation::Hold => run.held += 1,
                            }
                        }
                        Err(error) => {
                            warn!(
                                event_name = "pipeline.optimize.update_failed",
                                product_id = %record.id,
                                product_name = record.display_name(),
                                error = %error,
                                "failed to write price suggestion"
                            );
                            run.failures.push(UpdateFailure {
                                product_id: record.id.clone(),
                                product_name: record.display_name().to_string(),
                                message: error.to_string(),
                            });
                        }
                    }
                }
            }

            if (position + 1) % PROGRESS_EVERY == 0 {
                info!(
                    event_name = "pipeline.optimize.progress",
                    processed = position + 1,
                    total = run.total,
                    "optimization progress"
                );
            }
        }

        Ok(run)
    }
}
