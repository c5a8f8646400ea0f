//! Observability for the chain analyzer: structured logging and metrics.
//!
//! The library only records `metrics` counters and histograms; installing an
//! exporter is left to the embedding application. Without one, recording is a
//! no-op.

mod metrics;
mod tracing;

pub use self::metrics::{
    record_cache_lookup, record_chain_parse, record_metric_undefined, record_rows_dropped,
};
pub use self::tracing::{TracingError, init_tracing};
