//! Gamma exposure profile and flip point.

use serde::{Deserialize, Serialize};

use super::strikes::aggregate_by_strike;
use crate::chain::ContractRecord;

/// Net gamma exposure at one strike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GexStrike {
    /// Strike price.
    pub strike: f64,
    /// Call-side exposure (non-negative for non-negative gamma).
    pub call_gex: f64,
    /// Put-side exposure, already signed negative.
    pub put_gex: f64,
    /// `call_gex + put_gex`.
    pub net_gex: f64,
}

/// Gamma exposure profile of one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexProfile {
    /// Per-strike exposure, ascending by strike.
    pub by_strike: Vec<GexStrike>,
    /// Sum of signed exposure over every contract.
    pub total_net_gex: f64,
    /// Interpolated zero crossing nearest to spot.
    pub flip_point: Option<f64>,
    /// `spot - flip_point`.
    pub spot_switch_delta: Option<f64>,
}

impl GexProfile {
    /// Build the profile for one expiration's records.
    #[must_use]
    pub fn compute(records: &[ContractRecord], spot: f64) -> Self {
        let by_strike: Vec<GexStrike> =
            aggregate_by_strike(records, |acc: &mut GexStrike, r| {
                if r.is_call() {
                    acc.call_gex += r.gex_signed;
                } else {
                    acc.put_gex += r.gex_signed;
                }
                acc.net_gex += r.gex_signed;
            })
            .into_iter()
            .map(|(strike, acc)| GexStrike { strike, ..acc })
            .collect();

        let total_net_gex: f64 = by_strike.iter().map(|s| s.net_gex).sum();
        let curve: Vec<(f64, f64)> = by_strike.iter().map(|s| (s.strike, s.net_gex)).collect();
        let flip_point = flip_point(&curve, spot);

        Self {
            by_strike,
            total_net_gex,
            flip_point,
            spot_switch_delta: flip_point.map(|flip| spot - flip),
        }
    }
}

/// Zero crossing of a strike-sorted `(strike, net_gex)` curve nearest to `spot`.
///
/// Every adjacent pair whose signs differ is a candidate, interpolated
/// linearly; pairs with equal values are skipped. Ties in distance keep the
/// lower crossing.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn flip_point(curve: &[(f64, f64)], spot: f64) -> Option<f64> {
    let mut best: Option<f64> = None;

    for pair in curve.windows(2) {
        let [(x0, y0), (x1, y1)] = [pair[0], pair[1]];
        if sign(y0) == sign(y1) || y1 == y0 {
            continue;
        }
        let crossing = x0 - y0 * (x1 - x0) / (y1 - y0);
        if !crossing.is_finite() {
            continue;
        }
        if best.is_none_or(|b| (crossing - spot).abs() < (b - spot).abs()) {
            best = Some(crossing);
        }
    }

    best
}

/// Three-way sign where zero is its own class.
fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;
    use crate::chain::OptionType;

    fn record(option_type: OptionType, strike: f64, gex_signed: f64) -> ContractRecord {
        let mut r = ContractRecord::new(
            option_type,
            strike,
            NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
        );
        r.gex_signed = gex_signed;
        r.gex_notional = gex_signed.abs();
        r
    }

    #[test]
    fn test_two_strike_crossing() {
        // -100 at 95, +300 at 105: 95 + 100 * 10 / 400 = 97.5
        let records = vec![
            record(OptionType::Put, 95.0, -100.0),
            record(OptionType::Call, 105.0, 300.0),
        ];
        let profile = GexProfile::compute(&records, 100.0);
        assert_eq!(profile.flip_point, Some(97.5));
        assert_eq!(profile.spot_switch_delta, Some(2.5));
        assert!((profile.total_net_gex - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_splits_sides() {
        let records = vec![
            record(OptionType::Call, 100.0, 50.0),
            record(OptionType::Put, 100.0, -20.0),
        ];
        let profile = GexProfile::compute(&records, 100.0);
        assert_eq!(
            profile.by_strike,
            vec![GexStrike {
                strike: 100.0,
                call_gex: 50.0,
                put_gex: -20.0,
                net_gex: 30.0,
            }]
        );
    }

    #[test]
    fn test_uniform_sign_has_no_flip() {
        let records = vec![
            record(OptionType::Call, 95.0, 10.0),
            record(OptionType::Call, 100.0, 20.0),
            record(OptionType::Call, 105.0, 5.0),
        ];
        let profile = GexProfile::compute(&records, 100.0);
        assert_eq!(profile.flip_point, None);
        assert_eq!(profile.spot_switch_delta, None);
    }

    #[test]
    fn test_all_zero_gamma() {
        let records = vec![
            record(OptionType::Call, 95.0, 0.0),
            record(OptionType::Put, 105.0, 0.0),
        ];
        let profile = GexProfile::compute(&records, 100.0);
        assert_eq!(profile.total_net_gex, 0.0);
        assert_eq!(profile.flip_point, None);
    }

    #[test]
    fn test_empty_and_single_strike() {
        let empty = GexProfile::compute(&[], 100.0);
        assert_eq!(empty.total_net_gex, 0.0);
        assert_eq!(empty.flip_point, None);
        assert!(empty.by_strike.is_empty());

        let single = GexProfile::compute(&[record(OptionType::Put, 100.0, -5.0)], 100.0);
        assert_eq!(single.flip_point, None);
    }

    #[test]
    fn test_nearest_crossing_wins() {
        // Crossings at 85 (far tail) and 101 (near spot)
        let curve = [(80.0, 10.0), (90.0, -10.0), (100.0, -10.0), (110.0, 80.0)];
        let flip = flip_point(&curve, 100.0).unwrap();
        assert!((flip - 101.111_111).abs() < 1e-5);
    }

    #[test]
    fn test_zero_boundary_counts_as_crossing() {
        let curve = [(90.0, -10.0), (100.0, 0.0)];
        assert_eq!(flip_point(&curve, 95.0), Some(100.0));
    }

    fn nonzero() -> impl Strategy<Value = f64> {
        prop_oneof![-1.0e9..-1.0e-3, 1.0e-3..1.0e9]
    }

    proptest! {
        #[test]
        fn prop_flip_strictly_between_and_nearest(
            values in prop::collection::vec(nonzero(), 2..40),
            spot in 0.0..400.0f64,
        ) {
            let curve: Vec<(f64, f64)> = values
                .iter()
                .enumerate()
                .map(|(i, &y)| (10.0 * (i as f64 + 1.0), y))
                .collect();

            let crossings: Vec<(f64, f64, f64)> = curve
                .windows(2)
                .filter(|w| (w[0].1 > 0.0) != (w[1].1 > 0.0))
                .map(|w| {
                    let (x0, y0) = w[0];
                    let (x1, y1) = w[1];
                    (x0, x1, x0 - y0 * (x1 - x0) / (y1 - y0))
                })
                .collect();

            match flip_point(&curve, spot) {
                None => prop_assert!(crossings.is_empty()),
                Some(flip) => {
                    let straddles = crossings
                        .iter()
                        .any(|&(x0, x1, c)| c == flip && flip > x0 && flip < x1);
                    prop_assert!(straddles);
                    for &(_, _, c) in &crossings {
                        prop_assert!((flip - spot).abs() <= (c - spot).abs());
                    }
                }
            }
        }

        #[test]
        fn prop_total_matches_records(
            gex in prop::collection::vec((1u32..50, -1.0e6..1.0e6f64), 0..60),
        ) {
            let records: Vec<ContractRecord> = gex
                .iter()
                .map(|&(k, g)| record(OptionType::Call, f64::from(k) * 5.0, g))
                .collect();
            let profile = GexProfile::compute(&records, 100.0);
            let direct: f64 = records.iter().map(|r| r.gex_signed).sum();
            let by_strike: f64 = profile.by_strike.iter().map(|s| s.net_gex).sum();
            prop_assert!((profile.total_net_gex - direct).abs() <= 1e-6 * (1.0 + direct.abs()));
            prop_assert_eq!(profile.total_net_gex, by_strike);
        }
    }
}
