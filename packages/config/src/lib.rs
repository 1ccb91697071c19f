#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the affordability pipeline.
//!
//! The defaults live in `default.toml`, embedded at compile time. A user
//! file only needs to list the keys it overrides; everything else falls
//! back to the defaults. Data file locations are resolved separately by
//! [`DataPaths`] from environment variables.

pub mod paths;

use std::path::Path;
use std::time::Duration;

use afford_map_housing_models::{BandTable, BandTableError, DEFAULT_AFFORDABLE_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use paths::DataPaths;

/// Embedded default configuration.
const DEFAULT_TOML: &str = include_str!("../default.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`AffordabilityConfig`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The values parsed but are inconsistent.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<BandTableError> for ConfigError {
    fn from(e: BandTableError) -> Self {
        Self::Invalid {
            message: format!("band table: {e}"),
        }
    }
}

/// Tunable affordability settings.
///
/// `affordable_threshold` and `bands` are independent: the first drives
/// the binary affordable/unaffordable flag on metro aggregates, the second
/// drives the five-tier display category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityConfig {
    /// Ratio at or below which a metro is flagged affordable.
    pub affordable_threshold: f64,
    /// Display classification bands.
    pub bands: BandTable,
    /// Upper clip applied to ratios for map coloring.
    pub max_ratio_clip: f64,
    /// Share of monthly income budgeted for rent.
    pub rent_budget_share: f64,
    /// Lifetime of memoized coordinate lookups, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for AffordabilityConfig {
    fn default() -> Self {
        Self {
            affordable_threshold: DEFAULT_AFFORDABLE_THRESHOLD,
            bands: BandTable::canonical(),
            max_ratio_clip: 15.0,
            rent_budget_share: 0.3,
            cache_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl AffordabilityConfig {
    /// Parses the embedded `default.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since it is a
    /// compile-time constant, a failure indicates a development error and
    /// is caught by the test suite.
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default.toml: {e}"))
    }

    /// Parses configuration from a TOML string and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or the values are
    /// inconsistent.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the given file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::embedded()), Self::from_path)
    }

    /// Checks that thresholds are finite and the band table is contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.affordable_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "affordable_threshold must be finite, got {}",
                    self.affordable_threshold
                ),
            });
        }
        if !(self.max_ratio_clip.is_finite() && self.max_ratio_clip > 0.0) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "max_ratio_clip must be positive, got {}",
                    self.max_ratio_clip
                ),
            });
        }
        if !(self.rent_budget_share > 0.0 && self.rent_budget_share <= 1.0) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "rent_budget_share must be in (0, 1], got {}",
                    self.rent_budget_share
                ),
            });
        }
        self.bands.validate()?;
        Ok(())
    }

    /// Returns the coordinate cache lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use afford_map_housing_models::{AffordabilityBand, AffordabilityCategory};

    use super::*;

    #[test]
    fn embedded_matches_default() {
        assert_eq!(AffordabilityConfig::embedded(), AffordabilityConfig::default());
        assert!(AffordabilityConfig::embedded().validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_threshold_only() {
        let config = AffordabilityConfig::from_toml_str("affordable_threshold = 5.0").unwrap();
        assert!((config.affordable_threshold - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.bands, BandTable::canonical());
    }

    #[test]
    fn bands_can_be_recalibrated_without_touching_threshold() {
        let toml = r#"
            [[bands]]
            category = "Affordable"
            upper = 2.5

            [[bands]]
            category = "Impossibly Unaffordable"
            lower = 2.5
        "#;
        let config = AffordabilityConfig::from_toml_str(toml).unwrap();
        assert!((config.affordable_threshold - DEFAULT_AFFORDABLE_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(
            config.bands.bands()[0],
            AffordabilityBand::new(AffordabilityCategory::Affordable, None, Some(2.5))
        );
    }

    #[test]
    fn rejects_gapped_bands() {
        let toml = r#"
            [[bands]]
            category = "Affordable"
            upper = 3.0

            [[bands]]
            category = "Impossibly Unaffordable"
            lower = 4.0
        "#;
        assert!(matches!(
            AffordabilityConfig::from_toml_str(toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_bad_budget_share() {
        assert!(matches!(
            AffordabilityConfig::from_toml_str("rent_budget_share = 0.0"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AffordabilityConfig::from_toml_str("affordable_threshold = \"high\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
