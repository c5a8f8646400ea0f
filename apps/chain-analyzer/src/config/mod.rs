//! Configuration for the chain analyzer.
//!
//! YAML configuration with environment variable interpolation and
//! validation. Every section is optional; defaults reproduce the
//! standard metric constants.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chain_analyzer::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! println!("band: {:?}", config.analytics.relevance_band);
//! ```

mod analytics;
mod cache;
mod observability;
mod parser;
mod surface;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use analytics::{AnalyticsConfig, IvBounds, RelevanceBand};
pub use cache::CacheConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use parser::ParserConfig;
pub use surface::SurfaceConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chain export parsing.
    #[serde(default)]
    pub parser: ParserConfig,
    /// Per-expiration metrics.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Volatility surface.
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Parsed snapshot cache.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    // An empty document means "all defaults"
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.parser.header_lines == 0 {
        return Err(ConfigError::ValidationError(
            "parser.header_lines must be at least 1".to_string(),
        ));
    }

    let multiplier = config.parser.contract_multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ConfigError::ValidationError(
            "parser.contract_multiplier must be positive".to_string(),
        ));
    }

    let band = &config.analytics.relevance_band;
    if band.lower <= 0.0 || band.upper <= 0.0 {
        return Err(ConfigError::ValidationError(
            "analytics.relevance_band bounds must be positive".to_string(),
        ));
    }
    if band.lower >= band.upper {
        return Err(ConfigError::ValidationError(
            "analytics.relevance_band.lower must be below upper".to_string(),
        ));
    }

    let iv = &config.analytics.iv_bounds;
    if iv.min < 0.0 || iv.min >= iv.max {
        return Err(ConfigError::ValidationError(
            "analytics.iv_bounds must satisfy 0 <= min < max".to_string(),
        ));
    }

    if config.analytics.bias_neutral_pct < 0.0 {
        return Err(ConfigError::ValidationError(
            "analytics.bias_neutral_pct must not be negative".to_string(),
        ));
    }

    if config.surface.grid_points < 2 {
        return Err(ConfigError::ValidationError(
            "surface.grid_points must be at least 2".to_string(),
        ));
    }

    if config.cache.max_entries == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_entries must be at least 1".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
