use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Counters describing one search run
#[derive(Debug, Default)]
pub struct ScanMetrics {
    // Traversal
    directories_entered: AtomicU64,
    enumeration_failures: AtomicU64,
    files_discovered: AtomicU64,

    // Scanning
    files_scanned: AtomicU64,
    files_skipped_oversize: AtomicU64,
    read_failures: AtomicU64,
    fallback_passes: AtomicU64,
    fallback_successes: AtomicU64,
    hits: AtomicU64,
}

impl ScanMetrics {
    /// Creates a zeroed ScanMetrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter before a new run
    pub fn reset(&self) {
        for counter in [
            &self.directories_entered,
            &self.enumeration_failures,
            &self.files_discovered,
            &self.files_scanned,
            &self.files_skipped_oversize,
            &self.read_failures,
            &self.fallback_passes,
            &self.fallback_successes,
            &self.hits,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn record_directory(&self) {
        self.directories_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enumeration_failure(&self) {
        self.enumeration_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discovered(&self, count: u64) {
        self.files_discovered.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a finished scan and how many lines it matched
    pub fn record_scan(&self, hits: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(hits, Ordering::Relaxed);
    }

    pub fn record_oversize_skip(&self, size: u64) {
        let total = self.files_skipped_oversize.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Skipped file of {} bytes, {} skipped so far", size, total);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that the fallback pass ran, and whether it found anything
    pub fn record_fallback(&self, succeeded: bool) {
        self.fallback_passes.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.fallback_successes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            directories_entered: self.directories_entered.load(Ordering::Relaxed),
            enumeration_failures: self.enumeration_failures.load(Ordering::Relaxed),
            files_discovered: self.files_discovered.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_skipped_oversize: self.files_skipped_oversize.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            fallback_passes: self.fallback_passes.load(Ordering::Relaxed),
            fallback_successes: self.fallback_successes.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Directories entered/failed: {}/{}\n\
             Files discovered/scanned/oversize/unreadable: {}/{}/{}/{}\n\
             Encoding fallback passes/successes: {}/{}\n\
             Matching lines: {}",
            stats.directories_entered,
            stats.enumeration_failures,
            stats.files_discovered,
            stats.files_scanned,
            stats.files_skipped_oversize,
            stats.read_failures,
            stats.fallback_passes,
            stats.fallback_successes,
            stats.hits
        );
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories_entered: u64,
    pub enumeration_failures: u64,
    pub files_discovered: u64,
    pub files_scanned: u64,
    pub files_skipped_oversize: u64,
    pub read_failures: u64,
    pub fallback_passes: u64,
    pub fallback_successes: u64,
    pub hits: u64,
}
