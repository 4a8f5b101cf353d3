//! Per-source ingestion counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe counters for one source's ingestion loop.
#[derive(Debug, Default)]
pub struct IngestStats {
    received: AtomicU64,
    points_sent: AtomicU64,
    skipped: AtomicU64,
    decode_errors: AtomicU64,
    sink_errors: AtomicU64,
    source_errors: AtomicU64,
    last_error: RwLock<Option<String>>,
}

impl IngestStats {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sent(&self) {
        self.points_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_error(&self, error: &impl ToString) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(error.to_string());
    }

    pub(crate) fn record_sink_error(&self, error: &impl ToString) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(error.to_string());
    }

    pub(crate) fn record_source_error(&self, error: &impl ToString) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(error.to_string());
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            received: self.received.load(Ordering::Relaxed),
            points_sent: self.points_sent.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSnapshot {
    /// Messages taken off the source's message channel.
    pub received: u64,
    /// Points the sink accepted.
    pub points_sent: u64,
    /// Valid messages that carried no metric.
    pub skipped: u64,
    /// Messages that failed to decode or translate.
    pub decode_errors: u64,
    /// Points the sink refused.
    pub sink_errors: u64,
    /// Errors reported on the source's error channel.
    pub source_errors: u64,
    /// Most recent error of any kind.
    pub last_error: Option<String>,
}

impl IngestSnapshot {
    /// Total number of failures of any kind.
    pub fn errors(&self) -> u64 {
        self.decode_errors + self.sink_errors + self.source_errors
    }
}

/// Registry of stats, one entry per source name.
#[derive(Debug, Default)]
pub(crate) struct StatsRegistry {
    sources: RwLock<BTreeMap<&'static str, Arc<IngestStats>>>,
}

impl StatsRegistry {
    /// Get or create the stats for a source.
    pub fn get_or_create(&self, source: &'static str) -> Arc<IngestStats> {
        // Fast path: check if it exists
        {
            let sources = self.sources.read();
            if let Some(stats) = sources.get(source) {
                return stats.clone();
            }
        }

        let mut sources = self.sources.write();
        sources.entry(source).or_default().clone()
    }

    /// Snapshot every registered source.
    pub fn collect(&self) -> BTreeMap<&'static str, IngestSnapshot> {
        self.sources
            .read()
            .iter()
            .map(|(name, stats)| (*name, stats.snapshot()))
            .collect()
    }
}
