//! Activity ratios and the drift score.
//!
//! The drift score is a volume-weighted average strike (VWAS) over the
//! relevance band. Two weightings exist:
//!
//! - [`DriftStrategy::GlobalVwas`]: calls and puts together (default)
//! - [`DriftStrategy::CallOnlyVwas`]: calls only, ignoring put hedging flow
//!
//! Both report the score, its offset from spot and a bias label.

use serde::{Deserialize, Serialize};

use super::strikes::{aggregate_by_strike, in_band};
use crate::chain::{ContractRecord, OptionType};
use crate::config::RelevanceBand;

/// Drift score weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStrategy {
    /// VWAS over every in-band contract.
    #[default]
    GlobalVwas,
    /// VWAS over in-band calls only.
    CallOnlyVwas,
}

impl DriftStrategy {
    /// Config and export name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GlobalVwas => "global_vwas",
            Self::CallOnlyVwas => "call_only_vwas",
        }
    }

    const fn includes(self, option_type: OptionType) -> bool {
        match self {
            Self::GlobalVwas => true,
            Self::CallOnlyVwas => option_type.is_call(),
        }
    }
}

/// Direction implied by the drift score relative to spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftBias {
    /// Activity centered above spot.
    Bullish,
    /// Activity centered below spot.
    Bearish,
    /// Activity centered on spot.
    Neutral,
}

impl DriftBias {
    /// Label `delta` against a neutral zone of `neutral_pct * spot`.
    #[must_use]
    pub fn classify(delta: f64, spot: f64, neutral_pct: f64) -> Self {
        let threshold = neutral_pct * spot.abs();
        if delta > threshold {
            Self::Bullish
        } else if delta < -threshold {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for DriftBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity ratio `volume / (open_interest + 1)` per side at one strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityStrike {
    /// Strike price.
    pub strike: f64,
    /// Call activity ratio.
    pub call_ratio: f64,
    /// Put activity ratio.
    pub put_ratio: f64,
    /// Put activity ratio negated.
    pub put_ratio_neg: f64,
}

/// Drift analysis of one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAnalysis {
    /// Weighting used for the score.
    pub strategy: DriftStrategy,
    /// Volume-weighted average strike, or spot when there is no volume.
    pub drift_score: f64,
    /// `drift_score - spot`.
    pub drift_delta: f64,
    /// Qualitative direction.
    pub bias: DriftBias,
    /// Volume behind the score.
    pub weighted_volume: u64,
    /// In-band activity ratios, ascending by strike.
    pub activity: Vec<ActivityStrike>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SideActivity {
    call_volume: u64,
    call_oi: u64,
    put_volume: u64,
    put_oi: u64,
}

impl DriftAnalysis {
    /// Compute activity ratios and the drift score.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(
        records: &[ContractRecord],
        spot: f64,
        band: &RelevanceBand,
        strategy: DriftStrategy,
        neutral_pct: f64,
    ) -> Self {
        let activity = activity_ratios(records, spot, band);

        let (weighted_strike, weighted_volume) = in_band(records, spot, band)
            .filter(|r| strategy.includes(r.option_type))
            .fold((0.0, 0u64), |(sum, vol), r| {
                (sum + r.strike * r.volume as f64, vol.saturating_add(r.volume))
            });

        let drift_score = if weighted_volume == 0 {
            spot
        } else {
            weighted_strike / weighted_volume as f64
        };
        let drift_delta = drift_score - spot;

        Self {
            strategy,
            drift_score,
            drift_delta,
            bias: DriftBias::classify(drift_delta, spot, neutral_pct),
            weighted_volume,
            activity,
        }
    }
}

/// Per-strike activity ratios for in-band strikes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn activity_ratios(
    records: &[ContractRecord],
    spot: f64,
    band: &RelevanceBand,
) -> Vec<ActivityStrike> {
    aggregate_by_strike(in_band(records, spot, band), |acc: &mut SideActivity, r| {
        match r.option_type {
            OptionType::Call => {
                acc.call_volume = acc.call_volume.saturating_add(r.volume);
                acc.call_oi = acc.call_oi.saturating_add(r.open_interest);
            }
            OptionType::Put => {
                acc.put_volume = acc.put_volume.saturating_add(r.volume);
                acc.put_oi = acc.put_oi.saturating_add(r.open_interest);
            }
        }
    })
    .into_iter()
    .map(|(strike, side)| {
        let call_ratio = side.call_volume as f64 / (side.call_oi as f64 + 1.0);
        let put_ratio = side.put_volume as f64 / (side.put_oi as f64 + 1.0);
        ActivityStrike {
            strike,
            call_ratio,
            put_ratio,
            put_ratio_neg: -put_ratio,
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;

    fn record(option_type: OptionType, strike: f64, volume: u64, oi: u64) -> ContractRecord {
        let mut r = ContractRecord::new(
            option_type,
            strike,
            NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
        );
        r.volume = volume;
        r.open_interest = oi;
        r
    }

    fn sample() -> Vec<ContractRecord> {
        vec![
            record(OptionType::Call, 110.0, 300, 99),
            record(OptionType::Put, 90.0, 100, 0),
            record(OptionType::Call, 100.0, 100, 49),
            // Out of band, ignored
            record(OptionType::Call, 200.0, 10_000, 1),
        ]
    }

    #[test]
    fn test_global_vwas() {
        let drift = DriftAnalysis::compute(
            &sample(),
            100.0,
            &RelevanceBand::default(),
            DriftStrategy::GlobalVwas,
            0.001,
        );
        // (110*300 + 90*100 + 100*100) / 500 = 104
        assert!((drift.drift_score - 104.0).abs() < 1e-9);
        assert!((drift.drift_delta - 4.0).abs() < 1e-9);
        assert_eq!(drift.bias, DriftBias::Bullish);
        assert_eq!(drift.weighted_volume, 500);
    }

    #[test]
    fn test_call_only_vwas() {
        let drift = DriftAnalysis::compute(
            &sample(),
            100.0,
            &RelevanceBand::default(),
            DriftStrategy::CallOnlyVwas,
            0.001,
        );
        // (110*300 + 100*100) / 400 = 107.5
        assert!((drift.drift_score - 107.5).abs() < 1e-9);
        assert_eq!(drift.weighted_volume, 400);
    }

    #[test]
    fn test_no_volume_defaults_to_spot() {
        let records = vec![record(OptionType::Call, 105.0, 0, 10)];
        let drift = DriftAnalysis::compute(
            &records,
            100.0,
            &RelevanceBand::default(),
            DriftStrategy::GlobalVwas,
            0.001,
        );
        assert_eq!(drift.drift_score, 100.0);
        assert_eq!(drift.drift_delta, 0.0);
        assert_eq!(drift.bias, DriftBias::Neutral);
    }

    #[test]
    fn test_activity_ratios_smooth_zero_oi() {
        let ratios = activity_ratios(&sample(), 100.0, &RelevanceBand::default());
        assert_eq!(ratios.len(), 3);

        // Put at 90: 100 / (0 + 1)
        assert_eq!(ratios[0].strike, 90.0);
        assert_eq!(ratios[0].put_ratio, 100.0);
        assert_eq!(ratios[0].put_ratio_neg, -100.0);
        assert_eq!(ratios[0].call_ratio, 0.0);

        // Call at 100: 100 / (49 + 1)
        assert_eq!(ratios[1].call_ratio, 2.0);
        // Call at 110: 300 / (99 + 1)
        assert_eq!(ratios[2].call_ratio, 3.0);
    }

    #[test_case(0.05, DriftBias::Neutral ; "inside neutral zone")]
    #[test_case(0.2, DriftBias::Bullish ; "above")]
    #[test_case(-0.2, DriftBias::Bearish ; "below")]
    fn test_bias_classification(delta: f64, expected: DriftBias) {
        assert_eq!(DriftBias::classify(delta, 100.0, 0.001), expected);
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&DriftStrategy::CallOnlyVwas).unwrap();
        assert_eq!(json, "\"call_only_vwas\"");
        assert_eq!(DriftStrategy::default().as_str(), "global_vwas");
    }
}
