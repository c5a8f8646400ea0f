//! Metrics engine configuration.

use serde::{Deserialize, Serialize};

use crate::analytics::DriftStrategy;
use crate::constants::{IV_CEILING, IV_FLOOR, RELEVANCE_BAND_LOWER, RELEVANCE_BAND_UPPER};

/// Metrics engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Strike window around spot used by walls, volume and drift.
    #[serde(default)]
    pub relevance_band: RelevanceBand,
    /// Implied volatility values accepted as valid (exclusive on both ends).
    #[serde(default)]
    pub iv_bounds: IvBounds,
    /// Drift score weighting.
    #[serde(default)]
    pub drift_strategy: DriftStrategy,
    /// Drift within this fraction of spot is labeled neutral.
    #[serde(default = "default_bias_neutral_pct")]
    pub bias_neutral_pct: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            relevance_band: RelevanceBand::default(),
            iv_bounds: IvBounds::default(),
            drift_strategy: DriftStrategy::default(),
            bias_neutral_pct: default_bias_neutral_pct(),
        }
    }
}

/// Strike window as fractions of spot, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceBand {
    /// Lower edge (fraction of spot).
    #[serde(default = "default_band_lower")]
    pub lower: f64,
    /// Upper edge (fraction of spot).
    #[serde(default = "default_band_upper")]
    pub upper: f64,
}

impl Default for RelevanceBand {
    fn default() -> Self {
        Self {
            lower: default_band_lower(),
            upper: default_band_upper(),
        }
    }
}

impl RelevanceBand {
    /// Absolute strike bounds for a spot price.
    #[must_use]
    pub fn bounds(&self, spot: f64) -> (f64, f64) {
        (self.lower * spot, self.upper * spot)
    }

    /// Whether a strike lies inside the band around `spot`.
    #[must_use]
    pub fn contains(&self, strike: f64, spot: f64) -> bool {
        let (lo, hi) = self.bounds(spot);
        strike >= lo && strike <= hi
    }
}

/// Open interval of usable implied volatility values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvBounds {
    /// Values at or below are missing.
    #[serde(default = "default_iv_min")]
    pub min: f64,
    /// Values at or above are bad prints.
    #[serde(default = "default_iv_max")]
    pub max: f64,
}

impl Default for IvBounds {
    fn default() -> Self {
        Self {
            min: default_iv_min(),
            max: default_iv_max(),
        }
    }
}

impl IvBounds {
    /// Whether `iv` is strictly inside the bounds.
    #[must_use]
    pub fn accepts(&self, iv: f64) -> bool {
        iv > self.min && iv < self.max
    }
}

const fn default_band_lower() -> f64 {
    RELEVANCE_BAND_LOWER
}

const fn default_band_upper() -> f64 {
    RELEVANCE_BAND_UPPER
}

const fn default_iv_min() -> f64 {
    IV_FLOOR
}

const fn default_iv_max() -> f64 {
    IV_CEILING
}

const fn default_bias_neutral_pct() -> f64 {
    0.001
}
