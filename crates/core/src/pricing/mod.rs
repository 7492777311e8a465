pub mod candidates;
pub mod optimizer;
pub mod reason;

pub use candidates::{PriceBounds, CANDIDATE_COUNT};
pub use optimizer::{select_best, PriceOptimizer, PricePoint, PriceRecommendation, PricingRun};
pub use reason::{change_pct, Recommendation};
