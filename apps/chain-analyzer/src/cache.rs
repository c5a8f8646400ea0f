//! Content-addressed cache of parsed snapshots.
//!
//! Keys are the SHA-256 of the raw export bytes, so re-submitting the same
//! file never re-parses it regardless of its name. Snapshots are shared as
//! `Arc` and never mutated after parsing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::chain::{ChainError, ChainParser, ChainSnapshot};
use crate::observability::record_cache_lookup;

/// Hex SHA-256 of the input bytes.
#[must_use]
pub fn content_key(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Bounded snapshot cache with insertion-order eviction.
#[derive(Debug)]
pub struct SnapshotCache {
    parser: ChainParser,
    entries: HashMap<String, Arc<ChainSnapshot>>,
    order: VecDeque<String>,
    max_entries: usize,
}

impl SnapshotCache {
    /// Create a cache holding at most `max_entries` snapshots (minimum 1).
    #[must_use]
    pub fn new(parser: ChainParser, max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            parser,
            entries: HashMap::with_capacity(max_entries),
            order: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Return the cached snapshot for `bytes`, parsing on first sight.
    ///
    /// # Errors
    ///
    /// Returns the parser's `ChainError`. Failures are not cached.
    pub fn get_or_parse(&mut self, bytes: &[u8]) -> Result<Arc<ChainSnapshot>, ChainError> {
        let key = content_key(bytes);

        if let Some(snapshot) = self.entries.get(&key) {
            record_cache_lookup("hit");
            tracing::debug!(key = %key, "Snapshot cache hit");
            return Ok(Arc::clone(snapshot));
        }

        record_cache_lookup("miss");
        let snapshot = Arc::new(self.parser.parse(bytes)?);
        self.insert(key, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn insert(&mut self, key: String, snapshot: Arc<ChainSnapshot>) {
        while self.order.len() >= self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "Evicted snapshot");
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, snapshot);
    }

    /// Check if `bytes` are already cached.
    #[must_use]
    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries.contains_key(&content_key(bytes))
    }

    /// Number of cached snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parser used on misses.
    #[must_use]
    pub const fn parser(&self) -> &ChainParser {
        &self.parser
    }
}
