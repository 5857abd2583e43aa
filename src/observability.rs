//! Observability: tracing setup and run counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_level`.
/// Logs go to stderr so stdout stays reserved for records.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Counters for one bridge run
#[derive(Debug, Default)]
pub struct RunMetrics {
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    executions_submitted: AtomicU64,
    polls_issued: AtomicU64,
    files_downloaded: AtomicU64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_succeeded(&self) {
        self.items_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "items_succeeded", "Metric incremented");
    }

    pub fn item_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "items_failed", "Metric incremented");
    }

    pub fn execution_submitted(&self) {
        self.executions_submitted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "executions_submitted", "Metric incremented");
    }

    pub fn poll_issued(&self) {
        self.polls_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files_downloaded(&self, count: usize) {
        self.files_downloaded.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "files_downloaded", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_succeeded: self.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            executions_submitted: self.executions_submitted.load(Ordering::Relaxed),
            polls_issued: self.polls_issued.load(Ordering::Relaxed),
            files_downloaded: self.files_downloaded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub executions_submitted: u64,
    pub polls_issued: u64,
    pub files_downloaded: u64,
}
