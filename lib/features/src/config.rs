//! Feature extraction configuration
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! min_genre_frequency = 1
//! max_genres = 20
//! max_text_features = 50
//! max_df = 0.9
//! ```

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vinylx_core::MIN_PLAUSIBLE_YEAR;

/// Limits for one categorical axis' vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLimits {
    pub min_frequency: u32,
    pub max_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    pub min_genre_frequency: u32,
    pub max_genres: usize,

    pub min_style_frequency: u32,
    pub max_styles: usize,

    pub min_artist_frequency: u32,
    pub max_artists: usize,

    pub min_label_frequency: u32,
    pub max_labels: usize,

    /// Upper bound on text terms kept after document-frequency pruning
    pub max_text_features: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: u32,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Drop English stop words before building n-grams
    pub text_stop_words: bool,

    /// Year against which recency is measured
    pub reference_year: i32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_genre_frequency: 2,
            max_genres: 50,
            min_style_frequency: 2,
            max_styles: 50,
            min_artist_frequency: 1,
            max_artists: 100,
            min_label_frequency: 1,
            max_labels: 50,
            max_text_features: 100,
            min_df: 1,
            max_df: 0.8,
            text_stop_words: true,
            reference_year: 2024,
        }
    }
}

impl FeatureConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: FeatureConfig =
            toml::from_str(s).map_err(|e| FeatureError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeatureError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(FeatureError::Configuration(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.reference_year <= MIN_PLAUSIBLE_YEAR {
            return Err(FeatureError::Configuration(format!(
                "reference_year must be after {}, got {}",
                MIN_PLAUSIBLE_YEAR, self.reference_year
            )));
        }
        Ok(())
    }

    pub fn genre_limits(&self) -> AxisLimits {
        AxisLimits {
            min_frequency: self.min_genre_frequency,
            max_size: self.max_genres,
        }
    }

    pub fn style_limits(&self) -> AxisLimits {
        AxisLimits {
            min_frequency: self.min_style_frequency,
            max_size: self.max_styles,
        }
    }

    pub fn artist_limits(&self) -> AxisLimits {
        AxisLimits {
            min_frequency: self.min_artist_frequency,
            max_size: self.max_artists,
        }
    }

    pub fn label_limits(&self) -> AxisLimits {
        AxisLimits {
            min_frequency: self.min_label_frequency,
            max_size: self.max_labels,
        }
    }
}
