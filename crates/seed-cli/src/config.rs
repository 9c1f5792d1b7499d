//! Optional TOML settings of the `seed` binary.
//!
//! ```toml
//! [mapping]
//! sample_rows = 5
//! fuzzy_threshold = 20
//! confidence_medium = 40
//! confidence_high = 75
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use seed_map::score::DEFAULT_THRESHOLD;
use seed_model::ConfidenceThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Data rows read from an uploaded file for validation.
    pub sample_rows: usize,
    /// Minimum fuzzy score for a suggestion to be kept.
    pub fuzzy_threshold: f64,
    pub confidence_medium: f64,
    pub confidence_high: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        let thresholds = ConfidenceThresholds::default();
        Self {
            sample_rows: 5,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            confidence_medium: thresholds.medium,
            confidence_high: thresholds.high,
        }
    }
}

impl MappingConfig {
    pub fn thresholds(&self) -> ConfidenceThresholds {
        ConfidenceThresholds {
            medium: self.confidence_medium,
            high: self.confidence_high,
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let mapping = &self.mapping;
        if !(0.0..=100.0).contains(&mapping.fuzzy_threshold) {
            bail!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                mapping.fuzzy_threshold
            );
        }
        if mapping.confidence_medium > mapping.confidence_high {
            bail!(
                "confidence_medium ({}) is above confidence_high ({})",
                mapping.confidence_medium,
                mapping.confidence_high
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("[mapping]\nsample_rows = 10\n").unwrap();
        assert_eq!(config.mapping.sample_rows, 10);
        assert_eq!(config.mapping.fuzzy_threshold, 20.0);
        assert_eq!(config.mapping.thresholds(), ConfidenceThresholds::default());
    }

    #[test]
    fn inverted_tiers_are_rejected() {
        let config: Config =
            toml::from_str("[mapping]\nconfidence_medium = 80\nconfidence_high = 60\n").unwrap();
        assert!(config.check().is_err());
    }
}
