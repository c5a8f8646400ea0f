//! Volatility surface configuration.

use serde::{Deserialize, Serialize};

/// Volatility surface configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Nodes per grid axis.
    #[serde(default = "default_grid_points")]
    pub grid_points: usize,
    /// Minimum valid points before falling back to calls or giving up.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            grid_points: default_grid_points(),
            min_points: default_min_points(),
        }
    }
}

const fn default_grid_points() -> usize {
    50
}

const fn default_min_points() -> usize {
    10
}
