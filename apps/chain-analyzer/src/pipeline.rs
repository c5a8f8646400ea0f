//! File-level orchestration.
//!
//! [`Analyzer`] owns the configuration and the snapshot cache, and is the
//! single entry point used by the binary: load an export, pick an
//! expiration, compute the metrics bundle, optionally export it.

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::analytics::{ExpiryAnalysis, VolSurface};
use crate::cache::SnapshotCache;
use crate::chain::{ChainParser, ChainSnapshot};
use crate::config::{Config, load_config};
use crate::error::AnalyzerError;
use crate::export::ExportDocument;

/// Chain analyzer session.
#[derive(Debug)]
pub struct Analyzer {
    config: Config,
    cache: SnapshotCache,
}

impl Analyzer {
    /// Create an analyzer from validated configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let parser = ChainParser::new(config.parser);
        Self::with_parser(config, parser)
    }

    /// Create an analyzer from a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read, parsed or validated.
    pub fn from_config_file(path: &Path) -> Result<Self, AnalyzerError> {
        let config = load_config(Some(&path.to_string_lossy()))?;
        Ok(Self::new(config))
    }

    /// Create an analyzer with an explicit parser.
    ///
    /// Used to pin the fallback snapshot date.
    #[must_use]
    pub fn with_parser(config: Config, parser: ChainParser) -> Self {
        let cache = SnapshotCache::new(parser, config.cache.max_entries);
        Self { config, cache }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot cache.
    #[must_use]
    pub const fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Read and parse an export file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Chain` if it cannot be parsed.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<ChainSnapshot>, AnalyzerError> {
        let bytes = std::fs::read(path).map_err(|e| AnalyzerError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read chain export");
        self.load_bytes(&bytes)
    }

    /// Parse an export held in memory.
    ///
    /// # Errors
    ///
    /// Returns `Chain` if the bytes cannot be parsed.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Arc<ChainSnapshot>, AnalyzerError> {
        Ok(self.cache.get_or_parse(bytes)?)
    }

    /// Resolve the expiration to analyze.
    ///
    /// `None` selects the expiration carrying the most open interest.
    ///
    /// # Errors
    ///
    /// Returns `NoExpirations` for an empty snapshot, `UnknownExpiration`
    /// if `requested` is not in the chain.
    pub fn select_expiration(
        snapshot: &ChainSnapshot,
        requested: Option<NaiveDate>,
    ) -> Result<NaiveDate, AnalyzerError> {
        let Some(default) = snapshot.default_expiration() else {
            return Err(AnalyzerError::NoExpirations);
        };

        match requested {
            None => Ok(default),
            Some(date) if snapshot.expirations().contains(&date) => Ok(date),
            Some(date) => Err(AnalyzerError::UnknownExpiration(date)),
        }
    }

    /// Compute the metrics bundle for one expiration.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::select_expiration`].
    pub fn analyze(
        &self,
        snapshot: &ChainSnapshot,
        expiration: Option<NaiveDate>,
    ) -> Result<ExpiryAnalysis, AnalyzerError> {
        let expiration = Self::select_expiration(snapshot, expiration)?;
        Ok(ExpiryAnalysis::compute(snapshot, expiration, &self.config.analytics))
    }

    /// Build the implied volatility surface over every expiration.
    ///
    /// # Errors
    ///
    /// Returns `Surface` when too few usable points exist.
    pub fn surface(&self, snapshot: &ChainSnapshot) -> Result<VolSurface, AnalyzerError> {
        Ok(VolSurface::build(
            snapshot,
            &self.config.analytics.iv_bounds,
            &self.config.surface,
        )?)
    }

    /// Assemble the export document stamped with the current time.
    #[must_use]
    pub fn export(snapshot: &ChainSnapshot, analysis: &ExpiryAnalysis) -> ExportDocument {
        ExportDocument::from_analysis(snapshot, analysis, Utc::now())
    }

    /// Write the export document for `analysis` to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Export` if the document cannot be serialized or written.
    pub fn write_export(
        snapshot: &ChainSnapshot,
        analysis: &ExpiryAnalysis,
        path: &Path,
    ) -> Result<(), AnalyzerError> {
        Self::export(snapshot, analysis).write_json(path)?;
        Ok(())
    }
}
