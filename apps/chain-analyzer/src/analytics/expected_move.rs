//! One-standard-deviation expected move from at-the-money implied volatility.

use serde::{Deserialize, Serialize};

use crate::chain::ContractRecord;
use crate::config::IvBounds;
use crate::constants::MIN_DTE_YEARS;

/// Expected move for one expiration. All fields are `None` together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpectedMove {
    /// Strike closest to spot.
    pub atm_strike: Option<f64>,
    /// Mean implied volatility at the ATM strike.
    pub iv_atm: Option<f64>,
    /// `spot * iv_atm * sqrt(dte_years)`.
    pub move_points: Option<f64>,
    /// `spot + move`.
    pub upper_band: Option<f64>,
    /// `spot - move`.
    pub lower_band: Option<f64>,
}

impl ExpectedMove {
    /// Compute the expected move.
    ///
    /// Implied volatility outside `iv_bounds` counts as missing. Time to
    /// expiry is floored at one calendar day.
    #[must_use]
    pub fn compute(records: &[ContractRecord], spot: f64, iv_bounds: &IvBounds) -> Self {
        if !(spot > 0.0 && spot.is_finite()) {
            return Self::default();
        }

        let Some(atm_strike) = records
            .iter()
            .map(|r| r.strike)
            .min_by(|a, b| (a - spot).abs().total_cmp(&(b - spot).abs()).then(a.total_cmp(b)))
        else {
            return Self::default();
        };

        #[allow(clippy::float_cmp)]
        let atm: Vec<&ContractRecord> = records.iter().filter(|r| r.strike == atm_strike).collect();

        let ivs: Vec<f64> = atm
            .iter()
            .map(|r| r.implied_volatility)
            .filter(|iv| iv_bounds.accepts(*iv))
            .collect();
        if ivs.is_empty() {
            return Self::default();
        }
        #[allow(clippy::cast_precision_loss)]
        let iv_atm = ivs.iter().sum::<f64>() / ivs.len() as f64;

        let dte_years = atm
            .first()
            .map_or(MIN_DTE_YEARS, |r| r.dte_years)
            .max(MIN_DTE_YEARS);
        let move_points = spot * iv_atm * dte_years.sqrt();

        Self {
            atm_strike: Some(atm_strike),
            iv_atm: Some(iv_atm),
            move_points: Some(move_points),
            upper_band: Some(spot + move_points),
            lower_band: Some(spot - move_points),
        }
    }

    /// Check if the move could be computed.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.move_points.is_some()
    }
}
