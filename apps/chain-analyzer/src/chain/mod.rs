//! Options chain parsing.
//!
//! Turns the raw bytes of a vendor chain export into a [`ChainSnapshot`]:
//! - Header metadata (spot price, snapshot timestamp)
//! - Wide call/put table reshaped into one record per contract
//! - Derived fields (days-to-expiry, moneyness, gamma exposure)
//!
//! # Example
//!
//! ```ignore
//! use chain_analyzer::chain::ChainParser;
//!
//! let bytes = std::fs::read("spx_quotedata.csv")?;
//! let snapshot = ChainParser::default().parse(&bytes)?;
//! for expiry in snapshot.expirations() {
//!     println!("{expiry}: {} contracts", snapshot.slice(expiry).records().len());
//! }
//! ```

mod features;
mod header;
mod parser;
mod table;
mod types;

use thiserror::Error;

pub use features::{DropStats, FeatureContext, engineer, gex_notional, parse_expiration};
pub use header::{
    HeaderSpot, extract_spot, extract_timestamp_text, header_block, parse_snapshot_date,
};
pub use parser::{ChainParser, decode, parse_chain};
pub use table::{
    Column, HEADER_TOKEN, RawContract, RawTable, STRIKE_COLUMN, SideSchema, TableSchema,
    coerce_number, find_header_row, normalize_header, parse_number, read_table,
};
pub use types::{
    ChainSnapshot, ContractRecord, ExpirySlice, OptionType, ParseWarning, SpotSource,
    TimestampSource, expiration_label,
};

/// Structural failures that make a chain export unusable.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Input could not be decoded as text.
    #[error("Failed to decode chain export: {0}")]
    Decode(String),

    /// No line starts with the `Expiration Date` header token.
    #[error("Header row not found: no line starts with 'Expiration Date'")]
    HeaderNotFound,

    /// The pivot `Strike` column is absent.
    #[error("Column 'Strike' not found")]
    StrikeColumnMissing,

    /// A required per-side column is absent.
    #[error("Missing required {side} column '{column}'")]
    MissingColumn {
        /// Side lacking the column.
        side: OptionType,
        /// Canonical column name.
        column: &'static str,
    },

    /// The delimited section could not be tokenized.
    #[error("Failed to read chain table: {0}")]
    Csv(#[from] csv::Error),
}

impl ChainError {
    /// Stable reason string for logs and metrics labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DECODE_ERROR",
            Self::HeaderNotFound => "HEADER_NOT_FOUND",
            Self::StrikeColumnMissing => "STRIKE_COLUMN_MISSING",
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::Csv(_) => "CSV_ERROR",
        }
    }
}
