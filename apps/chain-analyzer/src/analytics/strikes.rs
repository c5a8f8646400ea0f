//! Strike grouping shared by the per-expiration metrics.

use crate::chain::ContractRecord;
use crate::config::RelevanceBand;

/// Fold records into one accumulator per distinct strike, ascending.
///
/// Records are sorted by strike with `total_cmp` before folding, so callers
/// may pass them in any order.
#[allow(clippy::float_cmp)] // strikes are exact quotes from one table
pub fn aggregate_by_strike<'a, T, I, F>(records: I, mut fold: F) -> Vec<(f64, T)>
where
    I: IntoIterator<Item = &'a ContractRecord>,
    T: Default,
    F: FnMut(&mut T, &ContractRecord),
{
    let mut sorted: Vec<&ContractRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    let mut grouped: Vec<(f64, T)> = Vec::new();
    for record in sorted {
        match grouped.last_mut() {
            Some((strike, acc)) if *strike == record.strike => fold(acc, record),
            _ => {
                let mut acc = T::default();
                fold(&mut acc, record);
                grouped.push((record.strike, acc));
            }
        }
    }
    grouped
}

/// Records whose strike lies inside the relevance band around `spot`.
pub fn in_band<'a>(
    records: &'a [ContractRecord],
    spot: f64,
    band: &'a RelevanceBand,
) -> impl Iterator<Item = &'a ContractRecord> + 'a {
    records
        .iter()
        .filter(move |r| band.contains(r.strike, spot))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::chain::OptionType;

    fn record(option_type: OptionType, strike: f64, oi: u64) -> ContractRecord {
        let mut r = ContractRecord::new(
            option_type,
            strike,
            NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
        );
        r.open_interest = oi;
        r
    }

    #[test]
    fn test_aggregate_sorts_and_sums() {
        let records = vec![
            record(OptionType::Put, 105.0, 3),
            record(OptionType::Call, 95.0, 1),
            record(OptionType::Call, 105.0, 4),
        ];
        let grouped = aggregate_by_strike(&records, |acc: &mut u64, r| *acc += r.open_interest);
        assert_eq!(grouped, vec![(95.0, 1), (105.0, 7)]);
    }

    #[test]
    fn test_aggregate_empty() {
        let grouped = aggregate_by_strike(&[], |acc: &mut u64, r| *acc += r.open_interest);
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_band_is_inclusive() {
        let records = vec![
            record(OptionType::Call, 74.9, 1),
            record(OptionType::Call, 75.0, 1),
            record(OptionType::Call, 125.0, 1),
            record(OptionType::Call, 125.1, 1),
        ];
        let band = RelevanceBand::default();
        let strikes: Vec<f64> = in_band(&records, 100.0, &band).map(|r| r.strike).collect();
        assert_eq!(strikes, vec![75.0, 125.0]);
    }
}
