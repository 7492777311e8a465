use serde::Serialize;

pub const CANDIDATE_COUNT: usize = 20;
pub const COST_FLOOR_MARKUP: f64 = 1.05;
pub const PRICE_FLOOR_FACTOR: f64 = 0.7;
pub const PRICE_CEILING_FACTOR: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceBounds {
    pub floor: f64,
    pub ceiling: f64,
}

impl PriceBounds {
    pub fn for_product(cost: f64, current_price: f64) -> Self {
        Self {
            floor: (cost * COST_FLOOR_MARKUP).max(current_price * PRICE_FLOOR_FACTOR),
            ceiling: current_price * PRICE_CEILING_FACTOR,
        }
    }

    /// Cost markup pushed the floor above the ceiling.
    pub fn is_degenerate(&self) -> bool {
        self.floor > self.ceiling
    }

    /// Evenly spaced trial prices from floor to ceiling, endpoints included,
    /// in increasing order. A degenerate range collapses to the floor alone so
    /// a suggestion never undercuts cost.
    pub fn candidates(&self) -> Vec<f64> {
        if self.is_degenerate() {
            return vec![self.floor];
        }

        let last = CANDIDATE_COUNT - 1;
        let step = (self.ceiling - self.floor) / last as f64;
        (0..CANDIDATE_COUNT)
            .map(|index| {
                if index == last {
                    self.ceiling
                } else {
                    self.floor + step * index as f64
                }
            })
            .collect()
    }
}
