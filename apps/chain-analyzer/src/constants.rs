//! Numeric constants shared by the parser and the metrics engine.

/// Calendar days per year used to convert days-to-expiry into years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Smallest time value fed into a square root (one calendar day).
pub const MIN_DTE_YEARS: f64 = 1.0 / DAYS_PER_YEAR;

/// Standard equity index option contract multiplier.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Largest volume or open interest accepted for a single contract line.
pub const MAX_CONTRACT_QUANTITY: f64 = 1e12;

/// Number of leading lines scanned for header metadata.
pub const HEADER_SCAN_LINES: usize = 15;

/// Lower edge of the relevance band as a fraction of spot.
pub const RELEVANCE_BAND_LOWER: f64 = 0.75;

/// Upper edge of the relevance band as a fraction of spot.
pub const RELEVANCE_BAND_UPPER: f64 = 1.25;

/// Implied volatility values at or below this are treated as missing.
pub const IV_FLOOR: f64 = 0.01;

/// Implied volatility values at or above this are treated as bad prints.
pub const IV_CEILING: f64 = 1.50;

/// Label used when the snapshot timestamp could not be read.
pub const TIMESTAMP_UNAVAILABLE: &str = "unavailable";
