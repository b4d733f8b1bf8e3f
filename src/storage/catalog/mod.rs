#![forbid(unsafe_code)]

//! Name dictionary for labels, relationship types and property keys.
//!
//! Names are stored verbatim and handed to the rest of the store only as ids, so any
//! string (spaces, colons, non-ASCII) is a valid label, type or key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::types::{GraphError, Result, StrId};

/// Live dictionary counters.
#[derive(Default)]
pub struct DictMetrics {
    intern_calls: AtomicU64,
    intern_hits: AtomicU64,
    intern_misses: AtomicU64,
    resolve_calls: AtomicU64,
    resolve_misses: AtomicU64,
}

/// Point-in-time copy of [`DictMetrics`].
#[derive(Clone, Copy, Debug, Default)]
#[allow(missing_docs)]
pub struct DictMetricsSnapshot {
    pub intern_calls: u64,
    pub intern_hits: u64,
    pub intern_misses: u64,
    pub resolve_calls: u64,
    pub resolve_misses: u64,
}

impl DictMetricsSnapshot {
    /// Share of intern calls that found an existing entry.
    pub fn intern_hit_rate(&self) -> f64 {
        if self.intern_calls == 0 {
            return 0.0;
        }
        self.intern_hits as f64 / self.intern_calls as f64
    }
}

impl DictMetrics {
    /// Copies the current counter values.
    pub fn snapshot(&self) -> DictMetricsSnapshot {
        DictMetricsSnapshot {
            intern_calls: self.intern_calls.load(Ordering::Relaxed),
            intern_hits: self.intern_hits.load(Ordering::Relaxed),
            intern_misses: self.intern_misses.load(Ordering::Relaxed),
            resolve_calls: self.resolve_calls.load(Ordering::Relaxed),
            resolve_misses: self.resolve_misses.load(Ordering::Relaxed),
        }
    }

    fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Bidirectional string ↔ id map. Ids start at 1 and are never reused.
///
/// Entries are not part of transactional state: a name interned by a transaction that
/// later rolls back stays in the dictionary.
#[derive(Default)]
pub struct Dict {
    s2i: FxHashMap<String, StrId>,
    i2s: Vec<String>,
    metrics: Arc<DictMetrics>,
}

impl Dict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns dictionary counters.
    pub fn metrics_snapshot(&self) -> DictMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Looks up the identifier for the provided string without mutating the dictionary.
    pub fn lookup(&self, s: &str) -> Option<StrId> {
        self.s2i.get(s).copied()
    }

    /// Returns the id of `s`, assigning the next free id on first use.
    pub fn intern(&mut self, s: &str) -> Result<StrId> {
        self.metrics.inc(&self.metrics.intern_calls);
        if let Some(existing) = self.s2i.get(s) {
            self.metrics.inc(&self.metrics.intern_hits);
            trace!(len = s.len(), id = existing.0, "dict.intern.hit");
            return Ok(*existing);
        }
        self.metrics.inc(&self.metrics.intern_misses);
        let next = u32::try_from(self.i2s.len() + 1)
            .ok()
            .filter(|next| *next != u32::MAX)
            .ok_or(GraphError::Invalid("string id overflow"))?;
        let id = StrId(next);
        self.i2s.push(s.to_owned());
        self.s2i.insert(s.to_owned(), id);
        trace!(len = s.len(), id = id.0, "dict.intern.insert");
        Ok(id)
    }

    /// Returns the name behind `id`.
    pub fn resolve(&self, id: StrId) -> Result<&str> {
        self.metrics.inc(&self.metrics.resolve_calls);
        let entry = (id.0 as usize)
            .checked_sub(1)
            .and_then(|idx| self.i2s.get(idx));
        match entry {
            Some(name) => Ok(name.as_str()),
            None => {
                self.metrics.inc(&self.metrics.resolve_misses);
                trace!(id = id.0, "dict.resolve.miss");
                Err(GraphError::NotFound("dictionary entry"))
            }
        }
    }
}
