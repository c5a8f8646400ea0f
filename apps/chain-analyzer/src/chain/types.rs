//! Core types for a parsed options chain snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionType {
    /// Sign applied to gamma exposure: calls positive, puts negative.
    #[must_use]
    pub const fn gex_sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Put => "Put",
        }
    }

    /// Check if this is the call side.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option contract for one expiration and one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Call or put.
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Vendor contract symbol.
    #[serde(default)]
    pub symbol: String,
    /// Strike price (always positive).
    pub strike: f64,
    /// Expiration date.
    pub expiration_date: NaiveDate,
    /// Last sale price.
    pub last: f64,
    /// Net change on the session.
    pub net: f64,
    /// Bid price.
    pub bid: f64,
    /// Ask price.
    pub ask: f64,
    /// Contracts traded.
    pub volume: u64,
    /// Outstanding contracts.
    pub open_interest: u64,
    /// Implied volatility as a fraction (0.18 = 18%). Unfiltered vendor value.
    pub implied_volatility: f64,
    /// Delta as reported by the vendor.
    pub delta: f64,
    /// Gamma as reported by the vendor.
    pub gamma: f64,
    /// Calendar days from the snapshot date to expiration.
    pub dte_days: i64,
    /// `dte_days / 365.25`.
    pub dte_years: f64,
    /// `strike / spot` (0 when spot is unresolved).
    pub moneyness: f64,
    /// Unsigned notional gamma exposure.
    pub gex_notional: f64,
    /// Gamma exposure signed by side (calls positive, puts negative).
    pub gex_signed: f64,
    /// Vendor columns outside the canonical schema, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ContractRecord {
    /// Create a record with the identifying key set and every value zeroed.
    #[must_use]
    pub fn new(option_type: OptionType, strike: f64, expiration_date: NaiveDate) -> Self {
        Self {
            option_type,
            symbol: String::new(),
            strike,
            expiration_date,
            last: 0.0,
            net: 0.0,
            bid: 0.0,
            ask: 0.0,
            volume: 0,
            open_interest: 0,
            implied_volatility: 0.0,
            delta: 0.0,
            gamma: 0.0,
            dte_days: 0,
            dte_years: 0.0,
            moneyness: 0.0,
            gex_notional: 0.0,
            gex_signed: 0.0,
            extra: BTreeMap::new(),
        }
    }

    /// Check if this is a call.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        self.option_type.is_call()
    }

    /// Check if this is a put.
    #[must_use]
    pub const fn is_put(&self) -> bool {
        !self.option_type.is_call()
    }
}

/// Where the spot price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotSource {
    /// `Last:` token in the header.
    Last,
    /// Midpoint of the `Bid:` / `Ask:` header tokens.
    BidAskMid,
    /// Median strike of the table (degraded).
    MedianStrike,
    /// Not resolvable; gamma exposure is zeroed.
    Unresolved,
}

/// Where the snapshot date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Parsed from the header `Date:` token.
    Header,
    /// Header date missing or unparseable; the current date was used.
    Fallback,
}

/// Non-fatal condition raised while parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// Snapshot timestamp could not be parsed; days-to-expiry are relative to today.
    TimestampUnavailable {
        /// Raw header text, if any was captured.
        raw: Option<String>,
    },
    /// Header had no usable spot; the median strike was used instead.
    SpotFromMedianStrike {
        /// The substituted spot price.
        spot: f64,
    },
    /// No spot could be resolved at all.
    SpotUnresolved,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampUnavailable { raw: Some(raw) } => {
                write!(f, "snapshot timestamp '{raw}' is unreadable; using today's date")
            }
            Self::TimestampUnavailable { raw: None } => {
                write!(f, "snapshot timestamp not found; using today's date")
            }
            Self::SpotFromMedianStrike { spot } => {
                write!(f, "spot price not found in header; using median strike {spot:.2}")
            }
            Self::SpotUnresolved => write!(f, "spot price unresolved; gamma exposure disabled"),
        }
    }
}

/// Immutable result of parsing one chain export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    records: Vec<ContractRecord>,
    spot_price: f64,
    spot_source: SpotSource,
    snapshot_date: NaiveDate,
    timestamp_label: String,
    timestamp_source: TimestampSource,
    warnings: Vec<ParseWarning>,
}

impl ChainSnapshot {
    /// Assemble a snapshot from already engineered records.
    #[must_use]
    pub const fn new(
        records: Vec<ContractRecord>,
        spot_price: f64,
        spot_source: SpotSource,
        snapshot_date: NaiveDate,
        timestamp_label: String,
        timestamp_source: TimestampSource,
        warnings: Vec<ParseWarning>,
    ) -> Self {
        Self {
            records,
            spot_price,
            spot_source,
            snapshot_date,
            timestamp_label,
            timestamp_source,
            warnings,
        }
    }

    /// All retained contracts.
    #[must_use]
    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    /// Underlying price at capture time (0 when unresolved).
    #[must_use]
    pub const fn spot_price(&self) -> f64 {
        self.spot_price
    }

    /// How the spot price was obtained.
    #[must_use]
    pub const fn spot_source(&self) -> SpotSource {
        self.spot_source
    }

    /// Date used as day zero for days-to-expiry.
    #[must_use]
    pub const fn snapshot_date(&self) -> NaiveDate {
        self.snapshot_date
    }

    /// Raw header timestamp text, or `"unavailable"`.
    #[must_use]
    pub fn timestamp_label(&self) -> &str {
        &self.timestamp_label
    }

    /// How the snapshot date was obtained.
    #[must_use]
    pub const fn timestamp_source(&self) -> TimestampSource {
        self.timestamp_source
    }

    /// Degraded-mode conditions hit while parsing.
    #[must_use]
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Number of retained contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no contracts survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct expirations, ascending.
    #[must_use]
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.expiration_date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Expiration carrying the most open interest (earliest on ties).
    #[must_use]
    pub fn default_expiration(&self) -> Option<NaiveDate> {
        let mut best: Option<(NaiveDate, u64)> = None;
        for date in self.expirations() {
            let oi: u64 = self
                .records
                .iter()
                .filter(|r| r.expiration_date == date)
                .fold(0u64, |acc, r| acc.saturating_add(r.open_interest));
            if best.is_none_or(|(_, top)| oi > top) {
                best = Some((date, oi));
            }
        }
        best.map(|(date, _)| date)
    }

    /// Records for a single expiration.
    #[must_use]
    pub fn slice(&self, expiration: NaiveDate) -> ExpirySlice {
        ExpirySlice {
            expiration,
            spot_price: self.spot_price,
            records: self
                .records
                .iter()
                .filter(|r| r.expiration_date == expiration)
                .cloned()
                .collect(),
        }
    }
}

/// The contracts of one expiration plus the shared spot price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirySlice {
    expiration: NaiveDate,
    spot_price: f64,
    records: Vec<ContractRecord>,
}

impl ExpirySlice {
    /// Build a slice directly from records.
    #[must_use]
    pub const fn new(expiration: NaiveDate, spot_price: f64, records: Vec<ContractRecord>) -> Self {
        Self {
            expiration,
            spot_price,
            records,
        }
    }

    /// The selected expiration.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Spot price shared by the snapshot.
    #[must_use]
    pub const fn spot_price(&self) -> f64 {
        self.spot_price
    }

    /// Contracts of this expiration.
    #[must_use]
    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    /// Check if the expiration has no contracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Selector label for an expiration, e.g. `2025-10-17 (Fri)`.
#[must_use]
pub fn expiration_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(option_type: OptionType, strike: f64, exp: NaiveDate, oi: u64) -> ContractRecord {
        ContractRecord {
            open_interest: oi,
            ..ContractRecord::new(option_type, strike, exp)
        }
    }

    fn snapshot(records: Vec<ContractRecord>) -> ChainSnapshot {
        ChainSnapshot::new(
            records,
            100.0,
            SpotSource::Last,
            date(2025, 10, 1),
            "1 ottobre 2025".to_string(),
            TimestampSource::Header,
            Vec::new(),
        )
    }

    #[test]
    fn test_gex_sign() {
        assert_eq!(OptionType::Call.gex_sign(), 1.0);
        assert_eq!(OptionType::Put.gex_sign(), -1.0);
    }

    #[test]
    fn test_expirations_sorted_unique() {
        let near = date(2025, 10, 3);
        let far = date(2025, 10, 17);
        let snap = snapshot(vec![
            record(OptionType::Call, 100.0, far, 5),
            record(OptionType::Put, 100.0, near, 5),
            record(OptionType::Call, 105.0, far, 5),
        ]);
        assert_eq!(snap.expirations(), vec![near, far]);
    }

    #[test]
    fn test_default_expiration_max_oi() {
        let near = date(2025, 10, 3);
        let far = date(2025, 10, 17);
        let snap = snapshot(vec![
            record(OptionType::Call, 100.0, near, 10),
            record(OptionType::Call, 100.0, far, 30),
            record(OptionType::Put, 95.0, near, 15),
        ]);
        assert_eq!(snap.default_expiration(), Some(far));
    }

    #[test]
    fn test_default_expiration_tie_keeps_earliest() {
        let near = date(2025, 10, 3);
        let far = date(2025, 10, 17);
        let snap = snapshot(vec![
            record(OptionType::Call, 100.0, far, 10),
            record(OptionType::Call, 100.0, near, 10),
        ]);
        assert_eq!(snap.default_expiration(), Some(near));
    }

    #[test]
    fn test_default_expiration_empty() {
        assert_eq!(snapshot(Vec::new()).default_expiration(), None);
    }

    #[test]
    fn test_slice_filters_expiration() {
        let near = date(2025, 10, 3);
        let far = date(2025, 10, 17);
        let snap = snapshot(vec![
            record(OptionType::Call, 100.0, near, 1),
            record(OptionType::Put, 100.0, far, 1),
        ]);
        let slice = snap.slice(near);
        assert_eq!(slice.records().len(), 1);
        assert_eq!(slice.expiration(), near);
        assert!((slice.spot_price() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expiration_label() {
        assert_eq!(expiration_label(date(2025, 10, 17)), "2025-10-17 (Fri)");
    }

    #[test]
    fn test_warning_display() {
        let w = ParseWarning::SpotFromMedianStrike { spot: 4500.0 };
        assert!(w.to_string().contains("4500.00"));
    }
}
