//! Header metadata: spot price and snapshot timestamp.
//!
//! The vendor export carries free-form text above the table, e.g.
//!
//! ```text
//! SPX,Last: 5,842.47,Change: -12.4
//! Date: 17 ottobre 2025 alle ore 16:05 GMT-4,Bid: 5,842.10,Ask: 5,842.90,Size: 1x1
//! ```
//!
//! Values can be split across line breaks, so searches run against the first
//! lines joined into a single block.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::types::SpotSource;

/// Localized full month names mapped to their English form.
const MONTH_TRANSLATIONS: [(&str, &str); 12] = [
    ("gennaio", "January"),
    ("febbraio", "February"),
    ("marzo", "March"),
    ("aprile", "April"),
    ("maggio", "May"),
    ("giugno", "June"),
    ("luglio", "July"),
    ("agosto", "August"),
    ("settembre", "September"),
    ("ottobre", "October"),
    ("novembre", "November"),
    ("dicembre", "December"),
];

/// Separator between the date and the time of day in the localized timestamp.
const TIME_SEPARATOR: &str = " alle";

/// Spot price resolved from the header block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSpot {
    /// Spot price, if the header had one.
    pub price: Option<f64>,
    /// Which token supplied it.
    pub source: SpotSource,
}

#[allow(clippy::expect_used)] // Patterns are compile-time constants
fn last_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Last:\s*([\d,]+\.?\d*)").expect("last regex is valid"))
}

#[allow(clippy::expect_used)]
fn bid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Bid:\s*([\d,]+\.?\d*)").expect("bid regex is valid"))
}

#[allow(clippy::expect_used)]
fn ask_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Ask:\s*([\d,]+\.?\d*)").expect("ask regex is valid"))
}

#[allow(clippy::expect_used)]
fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Date:\s*(.*?)(?:,Bid|,Ask|GMT)").expect("date regex is valid")
    })
}

/// Join the first `max_lines` lines, trimmed, with single spaces.
#[must_use]
pub fn header_block(lines: &[&str], max_lines: usize) -> String {
    lines
        .iter()
        .take(max_lines)
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a header number such as `5,842.47`.
fn parse_header_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn capture_number(re: &Regex, block: &str) -> Option<f64> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_header_number(m.as_str()))
}

/// Resolve the spot price from the header block.
///
/// `Last` wins when present and non-zero. Otherwise the bid/ask midpoint is
/// used when both are present and the ask is positive. Anything else leaves
/// the spot unresolved for the caller's table-driven fallback.
#[must_use]
pub fn extract_spot(block: &str) -> HeaderSpot {
    if let Some(last) = capture_number(last_regex(), block).filter(|v| *v != 0.0) {
        return HeaderSpot {
            price: Some(last),
            source: SpotSource::Last,
        };
    }

    let bid = capture_number(bid_regex(), block);
    let ask = capture_number(ask_regex(), block);
    if let (Some(bid), Some(ask)) = (bid, ask) {
        if ask > 0.0 {
            return HeaderSpot {
                price: Some((bid + ask) / 2.0),
                source: SpotSource::BidAskMid,
            };
        }
    }

    HeaderSpot {
        price: None,
        source: SpotSource::Unresolved,
    }
}

/// Capture the raw timestamp text following `Date:`.
///
/// Falls back to a line-based search over the first ten lines for exports
/// where the block-level pattern does not terminate.
#[must_use]
pub fn extract_timestamp_text(block: &str, lines: &[&str]) -> Option<String> {
    if let Some(m) = date_regex().captures(block).and_then(|c| c.get(1)) {
        let text = m.as_str().trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    lines
        .iter()
        .take(10)
        .find(|line| line.contains("Date:") && line.contains("alle ore"))
        .and_then(|line| line.split(",Bid:").next())
        .map(|head| head.trim().replace("Date: ", ""))
        .filter(|text| !text.is_empty())
}

/// Parse a localized long date (`17 ottobre 2025 alle ore 16:05`) into a date.
///
/// The time-of-day suffix is ignored. English month names are accepted as-is.
#[must_use]
pub fn parse_snapshot_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split(TIME_SEPARATOR).next()?.trim().to_lowercase();

    let translated = MONTH_TRANSLATIONS
        .iter()
        .fold(date_part, |acc, (local, english)| acc.replace(local, english));

    let normalized = translated.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&normalized, "%d %B %Y").ok()
}
