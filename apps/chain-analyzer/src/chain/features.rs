//! Feature engineering: derived per-contract fields and row filtering.

use chrono::NaiveDate;

use super::table::RawContract;
use super::types::ContractRecord;
use crate::constants::{DAYS_PER_YEAR, MAX_CONTRACT_QUANTITY};

/// Accepted formats for the `Expiration Date` column.
const EXPIRATION_FORMATS: [&str; 2] = ["%a %b %d %Y", "%Y-%m-%d"];

/// Inputs shared by every row's derived fields.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext {
    /// Resolved spot price (<= 0 when unresolved).
    pub spot: f64,
    /// Day zero for days-to-expiry.
    pub snapshot_date: NaiveDate,
    /// Contract multiplier.
    pub contract_multiplier: f64,
}

/// Rows removed during filtering, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropStats {
    /// Open interest zero or negative.
    pub no_open_interest: usize,
    /// Expired before the snapshot date.
    pub expired: usize,
    /// Expiration text did not parse.
    pub bad_expiration: usize,
    /// Strike zero, negative or missing.
    pub bad_strike: usize,
    /// Volume or open interest beyond [`MAX_CONTRACT_QUANTITY`].
    pub bad_quantity: usize,
}

impl DropStats {
    /// Total rows dropped.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.no_open_interest
            + self.expired
            + self.bad_expiration
            + self.bad_strike
            + self.bad_quantity
    }
}

/// Parse an expiration cell such as `Fri Oct 17 2025`.
#[must_use]
pub fn parse_expiration(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    EXPIRATION_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Notional gamma exposure of one contract line.
///
/// `gamma * open_interest * multiplier * (spot / 100) * spot`; zero when the
/// spot is unresolved.
#[must_use]
pub fn gex_notional(gamma: f64, open_interest: f64, spot: f64, contract_multiplier: f64) -> f64 {
    if spot <= 0.0 || !spot.is_finite() {
        return 0.0;
    }
    gamma * open_interest * contract_multiplier * (spot / 100.0) * spot
}

/// Compute derived fields and drop untraded, expired or malformed rows.
#[must_use]
pub fn engineer(raw: Vec<RawContract>, ctx: &FeatureContext) -> (Vec<ContractRecord>, DropStats) {
    let mut stats = DropStats::default();
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        if row.strike <= 0.0 {
            stats.bad_strike += 1;
            continue;
        }
        let Some(expiration_date) = parse_expiration(&row.expiration) else {
            stats.bad_expiration += 1;
            continue;
        };
        if row.open_interest > MAX_CONTRACT_QUANTITY || row.volume > MAX_CONTRACT_QUANTITY {
            stats.bad_quantity += 1;
            continue;
        }
        let open_interest = row.open_interest.round();
        if open_interest <= 0.0 {
            stats.no_open_interest += 1;
            continue;
        }
        let dte_days = (expiration_date - ctx.snapshot_date).num_days();
        if dte_days < 0 {
            stats.expired += 1;
            continue;
        }

        let volume = row.volume.max(0.0).round() as u64;
        let moneyness = if ctx.spot > 0.0 { row.strike / ctx.spot } else { 0.0 };
        let notional = gex_notional(row.gamma, open_interest, ctx.spot, ctx.contract_multiplier);

        records.push(ContractRecord {
            option_type: row.option_type,
            symbol: row.symbol,
            strike: row.strike,
            expiration_date,
            last: row.last,
            net: row.net,
            bid: row.bid,
            ask: row.ask,
            volume,
            open_interest: open_interest as u64,
            implied_volatility: row.implied_volatility,
            delta: row.delta,
            gamma: row.gamma,
            dte_days,
            dte_years: dte_days as f64 / DAYS_PER_YEAR,
            moneyness,
            gex_notional: notional,
            gex_signed: notional * row.option_type.gex_sign(),
            extra: row.extra,
        });
    }

    (records, stats)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::chain::types::OptionType;

    fn raw(option_type: OptionType, strike: f64, oi: f64, gamma: f64, exp: &str) -> RawContract {
        RawContract {
            option_type,
            symbol: String::new(),
            strike,
            expiration: exp.to_string(),
            last: 0.0,
            net: 0.0,
            bid: 0.0,
            ask: 0.0,
            volume: 10.0,
            open_interest: oi,
            implied_volatility: 0.2,
            delta: 0.0,
            gamma,
            extra: BTreeMap::new(),
        }
    }

    fn ctx(spot: f64) -> FeatureContext {
        FeatureContext {
            spot,
            snapshot_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
            contract_multiplier: 100.0,
        }
    }

    #[test]
    fn test_parse_expiration_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 17);
        assert_eq!(parse_expiration("Fri Oct 17 2025"), expected);
        assert_eq!(parse_expiration("2025-10-17"), expected);
        assert_eq!(parse_expiration("17/10/2025"), None);
    }

    #[test]
    fn test_gex_notional_formula() {
        // 0.01 * 1000 * 100 * (100 / 100) * 100
        assert!((gex_notional(0.01, 1000.0, 100.0, 100.0) - 100_000.0).abs() < 1e-6);
        assert_eq!(gex_notional(0.01, 1000.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_derived_fields() {
        let (records, stats) = engineer(
            vec![
                raw(OptionType::Call, 110.0, 50.0, 0.02, "Fri Oct 17 2025"),
                raw(OptionType::Put, 90.0, 50.0, 0.02, "Fri Oct 17 2025"),
            ],
            &ctx(100.0),
        );
        assert_eq!(stats.total(), 0);

        let call = &records[0];
        assert_eq!(call.dte_days, 7);
        assert!((call.dte_years - 7.0 / 365.25).abs() < 1e-12);
        assert!((call.moneyness - 1.1).abs() < 1e-12);
        assert!((call.gex_notional - 10_000.0).abs() < 1e-6);
        assert_eq!(call.gex_signed, call.gex_notional);

        let put = &records[1];
        assert_eq!(put.gex_signed, -put.gex_notional);
    }

    #[test]
    fn test_filters() {
        let (records, stats) = engineer(
            vec![
                raw(OptionType::Call, 100.0, 0.0, 0.01, "Fri Oct 17 2025"),
                raw(OptionType::Call, 100.0, 5.0, 0.01, "Fri Oct 03 2025"),
                raw(OptionType::Call, 100.0, 5.0, 0.01, "garbage"),
                raw(OptionType::Call, 0.0, 5.0, 0.01, "Fri Oct 17 2025"),
                raw(OptionType::Put, 100.0, 5.0, 0.01, "Fri Oct 10 2025"),
            ],
            &ctx(100.0),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dte_days, 0);
        assert_eq!(
            stats,
            DropStats {
                no_open_interest: 1,
                expired: 1,
                bad_expiration: 1,
                bad_strike: 1,
                bad_quantity: 0,
            }
        );
    }

    #[test]
    fn test_oversized_quantities_dropped() {
        let mut huge_volume = raw(OptionType::Call, 100.0, 5.0, 0.01, "Fri Oct 17 2025");
        huge_volume.volume = 1e20;
        let huge_oi = raw(OptionType::Put, 100.0, 1e20, 0.01, "Fri Oct 17 2025");
        let at_limit = raw(OptionType::Put, 105.0, MAX_CONTRACT_QUANTITY, 0.01, "Fri Oct 17 2025");

        let (records, stats) = engineer(vec![huge_volume, huge_oi, at_limit], &ctx(100.0));

        assert_eq!(stats.bad_quantity, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].open_interest, 1_000_000_000_000);
    }

    #[test]
    fn test_unresolved_spot_zeroes_gex() {
        let (records, _) = engineer(
            vec![raw(OptionType::Call, 100.0, 5.0, 0.05, "Fri Oct 17 2025")],
            &ctx(0.0),
        );
        assert_eq!(records[0].gex_notional, 0.0);
        assert_eq!(records[0].gex_signed, 0.0);
        assert_eq!(records[0].moneyness, 0.0);
    }
}
