// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::cast_precision_loss
    )
)]

//! Chain Analyzer - Options Chain Market-Structure Analytics
//!
//! Parses a single-snapshot options chain export and derives the
//! positioning metrics traders read off a chain.
//!
//! # Modules
//!
//! - `chain`: decoding, header metadata, wide-table reshaping, derived fields
//! - `analytics`: GEX and flip point, OI walls, Max Pain, put/call ratios,
//!   expected move, volume profile, activity ratios and drift, IV surface
//! - `cache`: content-addressed snapshot cache
//! - `export`: JSON export document
//! - `config`: YAML configuration with env interpolation
//! - `observability`: tracing subscriber and metrics counters
//! - `pipeline`: the [`Analyzer`] session tying the above together
//!
//! # Example
//!
//! ```ignore
//! use chain_analyzer::{Analyzer, config::Config};
//!
//! let mut analyzer = Analyzer::new(Config::default());
//! let snapshot = analyzer.load_file("spx_quotedata.csv".as_ref())?;
//! let analysis = analyzer.analyze(&snapshot, None)?;
//! println!("max pain: {:?}", analysis.max_pain.strike);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Core
// =============================================================================

pub mod analytics;
pub mod chain;
pub mod constants;

// =============================================================================
// Session
// =============================================================================

pub mod cache;
pub mod error;
pub mod export;
pub mod pipeline;

// =============================================================================
// Cross-cutting
// =============================================================================

pub mod config;
pub mod observability;

pub use analytics::ExpiryAnalysis;
pub use chain::{ChainError, ChainParser, ChainSnapshot, ContractRecord, OptionType};
pub use error::AnalyzerError;
pub use export::ExportDocument;
pub use pipeline::Analyzer;
