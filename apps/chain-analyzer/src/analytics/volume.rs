//! Volume profile within the relevance band.

use serde::{Deserialize, Serialize};

use super::strikes::{aggregate_by_strike, in_band};
use crate::chain::{ContractRecord, OptionType};
use crate::config::RelevanceBand;

/// One row of the bidirectional volume profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStrike {
    /// Strike price.
    pub strike: f64,
    /// Call volume.
    pub calls_volume: u64,
    /// Put volume.
    pub puts_volume: u64,
    /// Put volume negated.
    pub puts_volume_neg: i64,
}

/// Sum volume by strike and side for in-band strikes, ascending.
#[must_use]
pub fn volume_profile(records: &[ContractRecord], spot: f64, band: &RelevanceBand) -> Vec<VolumeStrike> {
    aggregate_by_strike(in_band(records, spot, band), |acc: &mut (u64, u64), r| {
        match r.option_type {
            OptionType::Call => acc.0 = acc.0.saturating_add(r.volume),
            OptionType::Put => acc.1 = acc.1.saturating_add(r.volume),
        }
    })
    .into_iter()
    .map(|(strike, (calls_volume, puts_volume))| VolumeStrike {
        strike,
        calls_volume,
        puts_volume,
        puts_volume_neg: -i64::try_from(puts_volume).unwrap_or(i64::MAX),
    })
    .collect()
}
