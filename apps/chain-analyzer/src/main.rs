//! Chain Analyzer Binary
//!
//! Parses one options chain export and prints the positioning metrics for a
//! single expiration.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin chain-analyzer -- spx_quotedata.csv --expiry 2025-10-17 --export out.json
//! ```
//!
//! # Environment Variables
//!
//! - `CHAIN_ANALYZER_CONFIG`: Config file path (default: config.yaml, if present)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::path::{Path, PathBuf};

use anyhow::Context;
use chain_analyzer::Analyzer;
use chain_analyzer::analytics::ExpiryAnalysis;
use chain_analyzer::chain::{ChainSnapshot, expiration_label};
use chain_analyzer::config::Config;
use chain_analyzer::observability::init_tracing;
use chrono::NaiveDate;
use clap::Parser;

/// Default config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Options chain market-structure analytics.
#[derive(Debug, Parser)]
#[command(name = "chain-analyzer", version, about)]
struct Cli {
    /// Chain export (CSV) to analyze.
    file: PathBuf,

    /// Expiration to analyze (defaults to the one with the most open interest).
    #[arg(long, value_name = "YYYY-MM-DD")]
    expiry: Option<NaiveDate>,

    /// Config file path.
    #[arg(long, env = "CHAIN_ANALYZER_CONFIG")]
    config: Option<PathBuf>,

    /// Write the JSON export to this path.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// List expirations and exit.
    #[arg(long)]
    list_expirations: bool,

    /// Also build the implied volatility surface.
    #[arg(long)]
    surface: bool,
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let mut analyzer = match config_path(cli.config.as_deref()) {
        Some(path) => Analyzer::from_config_file(&path)?,
        None => Analyzer::new(Config::default()),
    };
    init_tracing(&analyzer.config().observability.logging)?;

    tracing::info!(file = %cli.file.display(), "Starting chain analyzer");

    let snapshot = analyzer.load_file(&cli.file)?;

    if cli.list_expirations {
        for expiration in snapshot.expirations() {
            println!("{}", expiration_label(expiration));
        }
        return Ok(());
    }

    let analysis = analyzer.analyze(&snapshot, cli.expiry)?;
    print_report(&snapshot, &analysis);

    if cli.surface {
        match analyzer.surface(&snapshot) {
            Ok(surface) => println!(
                "IV surface: {} points, {}/{} nodes filled ({:?})",
                surface.points.len(),
                surface.filled_nodes(),
                surface.dte_axis.len() * surface.strike_axis.len(),
                surface.option_type,
            ),
            Err(e) => tracing::warn!(error = %e, "IV surface unavailable"),
        }
    }

    if let Some(path) = cli.export.as_deref() {
        Analyzer::write_export(&snapshot, &analysis, path)
            .with_context(|| format!("exporting to {}", path.display()))?;
    }

    Ok(())
}

/// Config file to load: the given path, else `config.yaml` if present.
fn config_path(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    }
}

fn print_report(snapshot: &ChainSnapshot, analysis: &ExpiryAnalysis) {
    let em = &analysis.expected_move;
    let walls = &analysis.walls;

    println!("Expiration:      {}", analysis.label);
    println!(
        "Spot:            {:.2} ({:?})",
        analysis.spot_price,
        snapshot.spot_source()
    );
    println!("Snapshot:        {}", snapshot.timestamp_label());
    println!("Contracts:       {}", analysis.contracts);
    println!();
    println!("Net GEX:         {:.0}", analysis.gex.total_net_gex);
    println!("Flip point:      {}", fmt_level(analysis.gex.flip_point));
    println!(
        "Put wall:        {} (OI {})",
        fmt_level(walls.put_wall.strike),
        walls.put_wall.open_interest
    );
    println!(
        "Call wall:       {} (OI {})",
        fmt_level(walls.call_wall.strike),
        walls.call_wall.open_interest
    );
    println!("Max pain:        {}", fmt_level(analysis.max_pain.strike));
    println!("P/C OI:          {}", fmt_level(analysis.ratios.oi_ratio));
    println!("P/C volume:      {}", fmt_level(analysis.ratios.volume_ratio));
    println!(
        "Expected move:   {} [{} - {}]",
        fmt_level(em.move_points),
        fmt_level(em.lower_band),
        fmt_level(em.upper_band)
    );
    println!(
        "Drift:           {:.2} ({:+.2}, {})",
        analysis.drift.drift_score, analysis.drift.drift_delta, analysis.drift.bias
    );

    for warning in snapshot.warnings() {
        println!("Warning:         {warning}");
    }
}

fn fmt_level(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Load environment variables from a `.env` file.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Walk parent directories looking for a `.env` file.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
