use chrono::{Datelike, Local, Month};
use serde::Serialize;

use crate::features::{season_for_month, ContextOverrides, Season};

/// The real-world month a run forecasts for, with its derived season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarContext {
    pub month: u32,
    pub season: Season,
}

impl CalendarContext {
    pub fn for_month(month: u32) -> Self {
        Self { month, season: season_for_month(month) }
    }

    pub fn now() -> Self {
        Self::for_month(Local::now().month())
    }

    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|month| Month::try_from(month).ok())
            .map(|month| month.name())
            .unwrap_or("Unknown")
    }

    pub fn overrides(&self) -> ContextOverrides {
        ContextOverrides::calendar(self.month, self.season)
    }
}
