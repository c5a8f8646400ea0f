//! Chain export parser: raw bytes to [`ChainSnapshot`].

use chrono::{Local, NaiveDate};

use super::ChainError;
use super::features::{FeatureContext, engineer};
use super::header::{extract_spot, extract_timestamp_text, header_block, parse_snapshot_date};
use super::table::{TableSchema, find_header_row, read_table};
use super::types::{ChainSnapshot, ParseWarning, SpotSource, TimestampSource};
use crate::config::ParserConfig;
use crate::constants::TIMESTAMP_UNAVAILABLE;
use crate::observability::{record_chain_parse, record_rows_dropped};

/// Parser for vendor chain exports.
#[derive(Debug, Clone, Default)]
pub struct ChainParser {
    config: ParserConfig,
    reference_date: Option<NaiveDate>,
}

impl ChainParser {
    /// Create a parser with the given configuration.
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self {
            config,
            reference_date: None,
        }
    }

    /// Pin the date used when the header timestamp is unusable (defaults to today).
    #[must_use]
    pub const fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Parser configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an export, returning `None` for any unusable file.
    ///
    /// The failure is logged; callers only need to tell the operator that the
    /// file cannot be analyzed.
    #[must_use]
    pub fn parse_or_none(&self, bytes: &[u8]) -> Option<ChainSnapshot> {
        match self.parse(bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::error!(error = %e, reason = e.reason(), "Chain export is unusable");
                None
            }
        }
    }

    /// Parse an export.
    ///
    /// # Errors
    ///
    /// Returns a `ChainError` for structural failures: undecodable input, no
    /// header row, no `Strike` column or a missing required column. Degraded
    /// conditions are reported as [`ParseWarning`]s instead. A table without
    /// data rows, like one whose rows are all filtered out, yields an empty
    /// snapshot.
    pub fn parse(&self, bytes: &[u8]) -> Result<ChainSnapshot, ChainError> {
        let result = self.parse_inner(bytes);
        match &result {
            Ok(snapshot) => record_chain_parse("ok", snapshot.len()),
            Err(e) => record_chain_parse(e.reason(), 0),
        }
        result
    }

    fn parse_inner(&self, bytes: &[u8]) -> Result<ChainSnapshot, ChainError> {
        let text = decode(bytes)?;
        let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();

        let block = header_block(&lines, self.config.header_lines);
        let header_spot = extract_spot(&block);
        let timestamp_text = extract_timestamp_text(&block, &lines);

        let header_index = find_header_row(&lines).ok_or(ChainError::HeaderNotFound)?;
        let table = read_table(&lines[header_index..].join("\n"))?;
        let schema = TableSchema::locate(&table.headers)?;

        let mut warnings = Vec::new();

        let (spot, spot_source) = if let Some(price) = header_spot.price {
            (price, header_spot.source)
        } else {
            match median(schema.strikes(&table.rows)) {
                Some(m) if m > 0.0 => {
                    tracing::warn!(spot = m, "Spot price not found in header, using median strike");
                    warnings.push(ParseWarning::SpotFromMedianStrike { spot: m });
                    (m, SpotSource::MedianStrike)
                }
                _ => {
                    tracing::warn!("Spot price unresolved, gamma exposure will be zero");
                    warnings.push(ParseWarning::SpotUnresolved);
                    (0.0, SpotSource::Unresolved)
                }
            }
        };

        let parsed_date = timestamp_text.as_deref().and_then(parse_snapshot_date);
        let (snapshot_date, timestamp_label, timestamp_source) = match (parsed_date, &timestamp_text) {
            (Some(date), Some(raw)) => (date, raw.clone(), TimestampSource::Header),
            _ => {
                let today = self.today();
                tracing::warn!(
                    raw = timestamp_text.as_deref().unwrap_or(""),
                    fallback = %today,
                    "Snapshot timestamp unavailable, using current date"
                );
                warnings.push(ParseWarning::TimestampUnavailable {
                    raw: timestamp_text.clone(),
                });
                (today, TIMESTAMP_UNAVAILABLE.to_string(), TimestampSource::Fallback)
            }
        };

        let raw = schema.split(&table.rows);
        let raw_count = raw.len();
        let ctx = FeatureContext {
            spot,
            snapshot_date,
            contract_multiplier: self.config.contract_multiplier,
        };
        let (records, dropped) = engineer(raw, &ctx);

        record_rows_dropped("no_open_interest", dropped.no_open_interest);
        record_rows_dropped("expired", dropped.expired);
        record_rows_dropped("bad_expiration", dropped.bad_expiration);
        record_rows_dropped("bad_strike", dropped.bad_strike);
        record_rows_dropped("bad_quantity", dropped.bad_quantity);
        tracing::debug!(
            raw = raw_count,
            no_open_interest = dropped.no_open_interest,
            expired = dropped.expired,
            bad_expiration = dropped.bad_expiration,
            bad_strike = dropped.bad_strike,
            bad_quantity = dropped.bad_quantity,
            "Filtered chain rows"
        );

        let snapshot = ChainSnapshot::new(
            records,
            spot,
            spot_source,
            snapshot_date,
            timestamp_label,
            timestamp_source,
            warnings,
        );

        tracing::info!(
            rows = snapshot.len(),
            spot = snapshot.spot_price(),
            snapshot_date = %snapshot.snapshot_date(),
            expirations = snapshot.expirations().len(),
            "Chain export parsed"
        );

        Ok(snapshot)
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Parse an export with the default configuration.
///
/// # Errors
///
/// See [`ChainParser::parse`].
pub fn parse_chain(bytes: &[u8]) -> Result<ChainSnapshot, ChainError> {
    ChainParser::default().parse(bytes)
}

/// Decode export bytes: UTF-8 first, Latin-1 otherwise.
///
/// # Errors
///
/// Returns `Decode` for empty input or binary content (NUL bytes).
pub fn decode(bytes: &[u8]) -> Result<String, ChainError> {
    if bytes.is_empty() {
        return Err(ChainError::Decode("input is empty".to_string()));
    }

    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps every byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };

    if text.contains('\0') {
        return Err(ChainError::Decode(
            "input contains NUL bytes, not a text export".to_string(),
        ));
    }

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Median of the values (mean of the middle pair for even counts).
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
