//! Every per-expiration metric, computed once per selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::drift::DriftAnalysis;
use super::expected_move::ExpectedMove;
use super::gex::GexProfile;
use super::max_pain::MaxPain;
use super::ratios::PutCallRatios;
use super::volume::{VolumeStrike, volume_profile};
use super::walls::OiWalls;
use crate::chain::{ChainSnapshot, ExpirySlice, expiration_label};
use crate::config::AnalyticsConfig;
use crate::observability::record_metric_undefined;

/// Metrics bundle for one expiration.
///
/// Each metric is independent: an undefined value in one never prevents the
/// others from being computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryAnalysis {
    /// Selected expiration.
    pub expiration: NaiveDate,
    /// Selector label, e.g. `2025-10-17 (Fri)`.
    pub label: String,
    /// Spot price used throughout.
    pub spot_price: f64,
    /// Contracts in the slice.
    pub contracts: usize,
    /// Gamma exposure profile and flip point.
    pub gex: GexProfile,
    /// Open interest walls.
    pub walls: OiWalls,
    /// Max Pain and payout curve.
    pub max_pain: MaxPain,
    /// Put/call ratios.
    pub ratios: PutCallRatios,
    /// Expected move.
    pub expected_move: ExpectedMove,
    /// In-band volume profile.
    pub volume: Vec<VolumeStrike>,
    /// Activity ratios and drift score.
    pub drift: DriftAnalysis,
}

impl ExpiryAnalysis {
    /// Compute the bundle for `expiration` of `snapshot`.
    #[must_use]
    pub fn compute(snapshot: &ChainSnapshot, expiration: NaiveDate, config: &AnalyticsConfig) -> Self {
        Self::compute_slice(&snapshot.slice(expiration), config)
    }

    /// Compute the bundle for a prepared slice.
    #[must_use]
    pub fn compute_slice(slice: &ExpirySlice, config: &AnalyticsConfig) -> Self {
        let records = slice.records();
        let spot = slice.spot_price();
        let band = &config.relevance_band;

        let analysis = Self {
            expiration: slice.expiration(),
            label: expiration_label(slice.expiration()),
            spot_price: spot,
            contracts: records.len(),
            gex: GexProfile::compute(records, spot),
            walls: OiWalls::compute(records, spot, band),
            max_pain: MaxPain::compute(records),
            ratios: PutCallRatios::compute(records),
            expected_move: ExpectedMove::compute(records, spot, &config.iv_bounds),
            volume: volume_profile(records, spot, band),
            drift: DriftAnalysis::compute(
                records,
                spot,
                band,
                config.drift_strategy,
                config.bias_neutral_pct,
            ),
        };

        let undefined = analysis.undefined_metrics();
        for metric in &undefined {
            record_metric_undefined(metric);
        }

        tracing::info!(
            expiration = %analysis.expiration,
            contracts = analysis.contracts,
            total_net_gex = analysis.gex.total_net_gex,
            flip_point = ?analysis.gex.flip_point,
            max_pain = ?analysis.max_pain.strike,
            drift_score = analysis.drift.drift_score,
            undefined = ?undefined,
            "Expiration analyzed"
        );

        analysis
    }

    /// Names of the metrics that came out undefined.
    #[must_use]
    pub fn undefined_metrics(&self) -> Vec<&'static str> {
        [
            ("flip_point", self.gex.flip_point.is_none()),
            ("put_wall", self.walls.put_wall.strike.is_none()),
            ("call_wall", self.walls.call_wall.strike.is_none()),
            ("max_pain", self.max_pain.strike.is_none()),
            ("pc_oi_ratio", self.ratios.oi_ratio.is_none()),
            ("pc_volume_ratio", self.ratios.volume_ratio.is_none()),
            ("expected_move", !self.expected_move.is_defined()),
        ]
        .into_iter()
        .filter_map(|(name, undefined)| undefined.then_some(name))
        .collect()
    }
}
