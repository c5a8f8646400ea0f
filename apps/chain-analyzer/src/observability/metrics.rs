//! Metrics for chain parsing, caching and metric computation.
//!
//! # Example
//!
//! ```ignore
//! use chain_analyzer::observability::record_chain_parse;
//!
//! record_chain_parse("ok", 1_250);
//! ```

use metrics::{counter, histogram};

// ============================================================================
// Parsing Metrics
// ============================================================================

/// Record a parse attempt.
///
/// # Arguments
///
/// * `outcome` - `ok` or the error reason (e.g., `HEADER_NOT_FOUND`)
/// * `rows` - Contract records retained (0 on failure)
pub fn record_chain_parse(outcome: &str, rows: usize) {
    counter!("chain_parse_total", "outcome" => outcome.to_string()).increment(1);

    if outcome == "ok" {
        #[allow(clippy::cast_precision_loss)]
        histogram!("chain_parse_rows").record(rows as f64);
    }
}

/// Record rows removed during filtering.
///
/// # Arguments
///
/// * `reason` - Filter that removed them (e.g., `expired`)
/// * `count` - Rows removed; zero counts are skipped
pub fn record_rows_dropped(reason: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!("chain_rows_dropped_total", "reason" => reason.to_string()).increment(count as u64);
}

// ============================================================================
// Cache Metrics
// ============================================================================

/// Record a snapshot cache lookup (`hit` or `miss`).
pub fn record_cache_lookup(result: &str) {
    counter!("snapshot_cache_lookups_total", "result" => result.to_string()).increment(1);
}

// ============================================================================
// Analytics Metrics
// ============================================================================

/// Record a metric that came out undefined for the selected expiration.
pub fn record_metric_undefined(metric: &str) {
    counter!("metric_undefined_total", "metric" => metric.to_string()).increment(1);
}
