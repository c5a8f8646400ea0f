//! Max Pain: the settlement strike minimizing total intrinsic payout.

use serde::{Deserialize, Serialize};

use super::strikes::aggregate_by_strike;
use crate::chain::{ContractRecord, OptionType};

/// Intrinsic payout to option holders if the underlying settles at `strike`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutPoint {
    /// Candidate settlement price.
    pub strike: f64,
    /// Payout to call holders.
    pub call_payout: f64,
    /// Payout to put holders.
    pub put_payout: f64,
    /// `call_payout + put_payout`.
    pub total_payout: f64,
}

/// Max Pain result over the full strike range of one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxPain {
    /// Strike with the smallest total payout (lowest strike on ties).
    pub strike: Option<f64>,
    /// Payout at every distinct strike, ascending.
    pub curve: Vec<PayoutPoint>,
}

#[derive(Debug, Clone, Copy, Default)]
struct StrikeOi {
    calls: f64,
    puts: f64,
}

impl MaxPain {
    /// Compute the payout curve and its minimizer.
    ///
    /// Uses prefix sums over the sorted strikes, so the cost is dominated by
    /// the sort rather than the quadratic candidate-by-contract scan.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(records: &[ContractRecord]) -> Self {
        let grouped = aggregate_by_strike(records, |acc: &mut StrikeOi, r| match r.option_type {
            OptionType::Call => acc.calls += r.open_interest as f64,
            OptionType::Put => acc.puts += r.open_interest as f64,
        });
        let n = grouped.len();

        // Put side accumulates from the top strike down
        let mut put_oi_above = vec![0.0; n];
        let mut put_weighted_above = vec![0.0; n];
        let (mut oi_acc, mut weighted_acc) = (0.0, 0.0);
        for j in (0..n).rev() {
            put_oi_above[j] = oi_acc;
            put_weighted_above[j] = weighted_acc;
            let (strike, oi) = grouped[j];
            oi_acc += oi.puts;
            weighted_acc += strike * oi.puts;
        }

        let mut curve = Vec::with_capacity(n);
        let (mut call_oi_below, mut call_weighted_below) = (0.0, 0.0);
        for (j, &(strike, oi)) in grouped.iter().enumerate() {
            let call_payout = strike * call_oi_below - call_weighted_below;
            let put_payout = put_weighted_above[j] - strike * put_oi_above[j];
            curve.push(PayoutPoint {
                strike,
                call_payout,
                put_payout,
                total_payout: call_payout + put_payout,
            });
            call_oi_below += oi.calls;
            call_weighted_below += strike * oi.calls;
        }

        let strike = curve
            .iter()
            .fold(None::<&PayoutPoint>, |best, p| match best {
                Some(b) if b.total_payout <= p.total_payout => Some(b),
                _ => Some(p),
            })
            .map(|p| p.strike);

        Self { strike, curve }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;

    fn record(option_type: OptionType, strike: f64, oi: u64) -> ContractRecord {
        let mut r = ContractRecord::new(
            option_type,
            strike,
            NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
        );
        r.open_interest = oi;
        r
    }

    /// Direct evaluation of the payout sum at `settle`.
    #[allow(clippy::cast_precision_loss)]
    fn brute_force(records: &[ContractRecord], settle: f64) -> f64 {
        records
            .iter()
            .map(|r| {
                let intrinsic = match r.option_type {
                    OptionType::Call => (settle - r.strike).max(0.0),
                    OptionType::Put => (r.strike - settle).max(0.0),
                };
                intrinsic * r.open_interest as f64
            })
            .sum()
    }

    #[test]
    fn test_simple_curve() {
        let records = vec![
            record(OptionType::Call, 90.0, 10),
            record(OptionType::Call, 100.0, 10),
            record(OptionType::Put, 100.0, 10),
            record(OptionType::Put, 110.0, 10),
        ];
        let pain = MaxPain::compute(&records);

        // At 90: puts 10*10 + 20*10 = 300. At 100: calls 100, puts 100 = 200.
        // At 110: calls 200 + 100 = 300.
        let totals: Vec<f64> = pain.curve.iter().map(|p| p.total_payout).collect();
        assert_eq!(totals, vec![300.0, 200.0, 300.0]);
        assert_eq!(pain.strike, Some(100.0));
        assert_eq!(pain.curve[1].call_payout, 100.0);
        assert_eq!(pain.curve[1].put_payout, 100.0);
    }

    #[test]
    fn test_empty_is_undefined() {
        let pain = MaxPain::compute(&[]);
        assert_eq!(pain.strike, None);
        assert!(pain.curve.is_empty());
    }

    #[test]
    fn test_ties_take_lowest_strike() {
        let records = vec![
            record(OptionType::Call, 100.0, 1),
            record(OptionType::Call, 110.0, 1),
        ];
        // Both candidates: 100 -> 0, 110 -> 10
        assert_eq!(MaxPain::compute(&records).strike, Some(100.0));

        let flat = vec![record(OptionType::Call, 120.0, 0), record(OptionType::Put, 80.0, 0)];
        assert_eq!(MaxPain::compute(&flat).strike, Some(80.0));
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force_and_is_minimal(
            rows in prop::collection::vec((any::<bool>(), 1u32..200, 0u64..5_000), 1..60),
        ) {
            let records: Vec<ContractRecord> = rows
                .iter()
                .map(|&(call, k, oi)| {
                    let side = if call { OptionType::Call } else { OptionType::Put };
                    record(side, f64::from(k) * 5.0, oi)
                })
                .collect();
            let pain = MaxPain::compute(&records);

            for point in &pain.curve {
                let direct = brute_force(&records, point.strike);
                prop_assert!((point.total_payout - direct).abs() <= 1e-6 * (1.0 + direct));
            }

            let strike = pain.strike.unwrap();
            let best = pain.curve.iter().find(|p| p.strike == strike).unwrap().total_payout;
            prop_assert!(pain.curve.iter().all(|p| p.total_payout >= best));
        }
    }
}
