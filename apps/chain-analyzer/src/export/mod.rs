//! JSON export of one expiration's analysis.
//!
//! The document has five sections: `metadata`, `market_summary`,
//! `gamma_analysis`, `levels_support_resistance` and `drift_analysis`.
//! Undefined metrics serialize as `null`, dates as ISO-8601 strings.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    ActivityStrike, DriftBias, DriftStrategy, ExpiryAnalysis, GexStrike, OiStrike, PayoutPoint,
    VolumeStrike,
};
use crate::chain::{ChainSnapshot, SpotSource};

/// Application name written into the metadata section.
pub const APPLICATION_NAME: &str = "chain-analyzer";

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The document could not be serialized.
    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The export file could not be written.
    #[error("Failed to write export '{path}': {source}")]
    Io {
        /// Destination path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },
}

/// Export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Provenance.
    pub metadata: Metadata,
    /// Headline metrics.
    pub market_summary: MarketSummary,
    /// Gamma exposure.
    pub gamma_analysis: GammaAnalysis,
    /// Open interest walls.
    pub levels_support_resistance: Levels,
    /// Volume, activity and drift.
    pub drift_analysis: DriftSection,
}

/// Export provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Producing application.
    pub application: String,
    /// Producing version.
    pub version: String,
    /// When the export was produced.
    pub export_time: DateTime<Utc>,
    /// Selected expiration.
    pub selected_expiration: NaiveDate,
    /// Selector label of the expiration.
    pub expiration_label: String,
    /// Spot price used.
    pub spot_price: f64,
    /// Where the spot price came from.
    pub spot_source: SpotSource,
    /// Snapshot timestamp text, or `unavailable`.
    pub snapshot_timestamp: String,
    /// Snapshot date used as day zero.
    pub snapshot_date: NaiveDate,
    /// Non-fatal parse warnings.
    pub warnings: Vec<String>,
}

/// Headline metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    /// Max Pain strike.
    pub max_pain: Option<f64>,
    /// Put/call open interest ratio.
    pub pc_ratio_oi: Option<f64>,
    /// Put/call volume ratio.
    pub pc_ratio_volume: Option<f64>,
    /// Expected move in points.
    pub expected_move: Option<f64>,
    /// Lower expected band.
    pub expected_range_lower: Option<f64>,
    /// Upper expected band.
    pub expected_range_upper: Option<f64>,
    /// ATM implied volatility.
    pub iv_atm: Option<f64>,
    /// Max Pain payout curve.
    pub max_pain_curve: Vec<PayoutPoint>,
}

/// Gamma exposure section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaAnalysis {
    /// Total signed gamma exposure.
    pub total_net_gex: f64,
    /// Gamma flip point.
    pub flip_point: Option<f64>,
    /// `spot - flip_point`.
    pub spot_switch_delta: Option<f64>,
    /// Per-strike exposure.
    pub profile: Vec<GexStrike>,
}

/// Support and resistance section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    /// Put wall strike.
    pub put_wall_strike: Option<f64>,
    /// Put wall open interest.
    pub put_wall_oi: u64,
    /// Call wall strike.
    pub call_wall_strike: Option<f64>,
    /// Call wall open interest.
    pub call_wall_oi: u64,
    /// In-band open interest profile.
    pub oi_profile: Vec<OiStrike>,
}

/// Drift section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSection {
    /// Drift weighting.
    pub strategy: DriftStrategy,
    /// Drift score.
    pub drift_score: f64,
    /// `drift_score - spot`.
    pub drift_delta: f64,
    /// Qualitative bias.
    pub bias: DriftBias,
    /// In-band volume profile.
    pub volume_profile: Vec<VolumeStrike>,
    /// In-band activity ratios.
    pub activity_ratios: Vec<ActivityStrike>,
}

impl ExportDocument {
    /// Assemble the document from a snapshot and one expiration's analysis.
    #[must_use]
    pub fn from_analysis(
        snapshot: &ChainSnapshot,
        analysis: &ExpiryAnalysis,
        export_time: DateTime<Utc>,
    ) -> Self {
        let em = &analysis.expected_move;
        let walls = &analysis.walls;
        let drift = &analysis.drift;

        Self {
            metadata: Metadata {
                application: APPLICATION_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                export_time,
                selected_expiration: analysis.expiration,
                expiration_label: analysis.label.clone(),
                spot_price: analysis.spot_price,
                spot_source: snapshot.spot_source(),
                snapshot_timestamp: snapshot.timestamp_label().to_string(),
                snapshot_date: snapshot.snapshot_date(),
                warnings: snapshot.warnings().iter().map(ToString::to_string).collect(),
            },
            market_summary: MarketSummary {
                max_pain: analysis.max_pain.strike,
                pc_ratio_oi: analysis.ratios.oi_ratio,
                pc_ratio_volume: analysis.ratios.volume_ratio,
                expected_move: em.move_points,
                expected_range_lower: em.lower_band,
                expected_range_upper: em.upper_band,
                iv_atm: em.iv_atm,
                max_pain_curve: analysis.max_pain.curve.clone(),
            },
            gamma_analysis: GammaAnalysis {
                total_net_gex: analysis.gex.total_net_gex,
                flip_point: analysis.gex.flip_point,
                spot_switch_delta: analysis.gex.spot_switch_delta,
                profile: analysis.gex.by_strike.clone(),
            },
            levels_support_resistance: Levels {
                put_wall_strike: walls.put_wall.strike,
                put_wall_oi: walls.put_wall.open_interest,
                call_wall_strike: walls.call_wall.strike,
                call_wall_oi: walls.call_wall.open_interest,
                oi_profile: walls.profile.clone(),
            },
            drift_analysis: DriftSection {
                strategy: drift.strategy,
                drift_score: drift.drift_score,
                drift_delta: drift.drift_delta,
                bias: drift.bias,
                volume_profile: analysis.volume.clone(),
                activity_ratios: drift.activity.clone(),
            },
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialize` if the document cannot be encoded.
    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Serialize` or `Io` on failure.
    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "Export written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ContractRecord, OptionType, ParseWarning, TimestampSource};
    use crate::config::AnalyticsConfig;

    fn snapshot() -> ChainSnapshot {
        let expiration = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap();
        let mut call = ContractRecord::new(OptionType::Call, 105.0, expiration);
        call.open_interest = 100;
        call.volume = 20;
        call.gex_signed = 500.0;
        let mut put = ContractRecord::new(OptionType::Put, 95.0, expiration);
        put.open_interest = 80;
        put.gex_signed = -200.0;

        ChainSnapshot::new(
            vec![call, put],
            100.0,
            SpotSource::MedianStrike,
            NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
            "unavailable".to_string(),
            TimestampSource::Fallback,
            vec![ParseWarning::SpotFromMedianStrike { spot: 100.0 }],
        )
    }

    fn document() -> ExportDocument {
        let snap = snapshot();
        let expiration = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap();
        let analysis = ExpiryAnalysis::compute(&snap, expiration, &AnalyticsConfig::default());
        let export_time = DateTime::parse_from_rfc3339("2025-10-10T20:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ExportDocument::from_analysis(&snap, &analysis, export_time)
    }

    #[test]
    fn test_sections_and_nulls() {
        let json: serde_json::Value = serde_json::from_str(&document().to_json_string().unwrap()).unwrap();

        for section in [
            "metadata",
            "market_summary",
            "gamma_analysis",
            "levels_support_resistance",
            "drift_analysis",
        ] {
            assert!(json.get(section).is_some(), "missing section {section}");
        }

        assert_eq!(json["metadata"]["application"], "chain-analyzer");
        assert_eq!(json["metadata"]["selected_expiration"], "2025-10-17");
        assert_eq!(json["metadata"]["snapshot_timestamp"], "unavailable");
        assert_eq!(json["metadata"]["spot_source"], "median_strike");
        assert_eq!(json["metadata"]["warnings"].as_array().unwrap().len(), 1);

        // No IV anywhere: expected move undefined, not zero
        assert!(json["market_summary"]["expected_move"].is_null());
        assert!(json["market_summary"]["iv_atm"].is_null());
        assert_eq!(json["market_summary"]["pc_ratio_volume"], 0.0);

        assert_eq!(json["gamma_analysis"]["total_net_gex"], 300.0);
        // -200 at 95, +500 at 105
        let flip = json["gamma_analysis"]["flip_point"].as_f64().unwrap();
        assert!((flip - (95.0 + 20.0 / 7.0)).abs() < 1e-9);
        assert_eq!(json["levels_support_resistance"]["put_wall_strike"], 95.0);
        assert_eq!(json["levels_support_resistance"]["call_wall_oi"], 100);
        assert_eq!(json["drift_analysis"]["bias"], "Bullish");
        assert_eq!(json["drift_analysis"]["strategy"], "global_vwas");
    }

    #[test]
    fn test_export_reads_back() {
        let doc = document();
        let parsed: ExportDocument = serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(parsed.metadata, doc.metadata);
        assert_eq!(parsed.levels_support_resistance, doc.levels_support_resistance);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        document().write_json(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"levels_support_resistance\""));
    }

    #[test]
    fn test_write_json_bad_path() {
        let err = document()
            .write_json(Path::new("/nonexistent-dir/export.json"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
