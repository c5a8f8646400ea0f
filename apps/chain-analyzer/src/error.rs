//! Crate-level error type for file-level entry points.
//!
//! Per-module errors stay local (`ChainError`, `ConfigError`, `ExportError`,
//! `SurfaceError`); this enum wraps them for callers that drive the whole
//! pipeline.

use chrono::NaiveDate;
use thiserror::Error;

use crate::analytics::SurfaceError;
use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::export::ExportError;

/// Errors surfaced by [`crate::pipeline::Analyzer`].
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The export file could not be read.
    #[error("Failed to read chain export '{path}': {source}")]
    Io {
        /// Path to the export.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The export is structurally unusable.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Configuration failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Volatility surface could not be built.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// No contracts survived filtering.
    #[error("Chain has no tradable expirations")]
    NoExpirations,

    /// The requested expiration is not in the snapshot.
    #[error("Expiration {0} not found in chain")]
    UnknownExpiration(NaiveDate),
}

impl AnalyzerError {
    /// Stable reason string for logs and metrics labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Chain(e) => e.reason(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::Export(_) => "EXPORT_ERROR",
            Self::Surface(_) => "INSUFFICIENT_DATA",
            Self::NoExpirations => "NO_EXPIRATIONS",
            Self::UnknownExpiration(_) => "UNKNOWN_EXPIRATION",
        }
    }
}
