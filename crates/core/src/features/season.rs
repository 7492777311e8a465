use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Monsoon,
    Winter,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Summer, Season::Monsoon, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Monsoon => "Monsoon",
            Self::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a calendar month to its season: 3-6 Summer, 7-10 Monsoon, the rest Winter.
///
/// Months outside 1..=12 fall through to Winter, so the function never fails.
pub fn season_for_month(month: u32) -> Season {
    match month {
        3..=6 => Season::Summer,
        7..=10 => Season::Monsoon,
        _ => Season::Winter,
    }
}
