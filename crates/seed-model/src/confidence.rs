//! Confidence tiers for mapping suggestions.

use serde::{Deserialize, Serialize};

/// Confidence level categories for mapping quality assessment.
///
/// - `High`: near-certain matches that can be used without review
/// - `Medium`: good matches that should be verified
/// - `Low`: weak matches requiring manual confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Short label rendered next to a suggestion.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "med",
            Self::High => "high",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels on the 0-100 scale.
///
/// - below `medium`: [`ConfidenceLevel::Low`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - at or above `high`: [`ConfidenceLevel::High`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Minimum confidence for medium matches (default: 40).
    pub medium: f64,
    /// Minimum confidence for high matches (default: 75).
    pub high: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            medium: 40.0,
            high: 75.0,
        }
    }
}

impl ConfidenceThresholds {
    /// Categorizes a confidence score. Boundary values belong to the higher tier.
    #[must_use]
    pub fn categorize(&self, confidence: f64) -> ConfidenceLevel {
        if confidence >= self.high {
            ConfidenceLevel::High
        } else if confidence >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_round_up() {
        let t = ConfidenceThresholds::default();
        assert_eq!(t.categorize(39.9), ConfidenceLevel::Low);
        assert_eq!(t.categorize(40.0), ConfidenceLevel::Medium);
        assert_eq!(t.categorize(74.99), ConfidenceLevel::Medium);
        assert_eq!(t.categorize(75.0), ConfidenceLevel::High);
        assert_eq!(t.categorize(100.0).label(), "high");
    }
}
