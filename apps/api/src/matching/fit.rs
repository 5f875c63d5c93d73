use serde::{Deserialize, Serialize};

/// Categorical fit badge derived from a match percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitLevel {
    Strong,
    Good,
    Weak,
}

impl FitLevel {
    /// Display label for the HR badge.
    pub fn label(&self) -> &'static str {
        match self {
            FitLevel::Strong => "Strong Fit",
            FitLevel::Good => "Good Fit",
            FitLevel::Weak => "Weak Fit",
        }
    }
}

/// ≥75 → Strong, 50–74 → Good, otherwise Weak.
pub fn classify(percent: u32) -> FitLevel {
    if percent >= 75 {
        FitLevel::Strong
    } else if percent >= 50 {
        FitLevel::Good
    } else {
        FitLevel::Weak
    }
}
