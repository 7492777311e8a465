use serde::Serialize;

/// Percentage move (either way) the suggestion must exceed to count as a change.
pub const CHANGE_THRESHOLD_PCT: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Raise,
    Discount,
    Hold,
}

impl Recommendation {
    pub fn classify(change_pct: f64) -> Self {
        if change_pct > CHANGE_THRESHOLD_PCT {
            Self::Raise
        } else if change_pct < -CHANGE_THRESHOLD_PCT {
            Self::Discount
        } else {
            Self::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raise => "raise",
            Self::Discount => "discount",
            Self::Hold => "hold",
        }
    }

    pub fn reason(&self, demand: f64, price: f64, currency: &str) -> String {
        match self {
            Self::Raise => format!(
                "AI predicts {demand:.1} units demand at {currency}{price:.2}. High demand confidence."
            ),
            Self::Discount => format!(
                "Inventory velocity is low. Suggest discount to {currency}{price:.2} to boost sales (forecast {demand:.1} units)."
            ),
            Self::Hold => format!(
                "Current price is mathematically optimal for profit maximization ({demand:.1} units forecast at {currency}{price:.2})."
            ),
        }
    }
}

pub fn change_pct(suggested: f64, current: f64) -> f64 {
    (suggested - current) / current * 100.0
}
