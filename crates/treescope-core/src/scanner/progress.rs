/// Scan progress reporting: lightweight messages sent from scan workers
/// to whoever renders progress, via a bounded crossbeam channel.

use crate::model::NodeStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Progress updates sent while a tree is being built.
///
/// The tree itself is only available once the build returns; these
/// messages carry counters and status flags.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        dirs_found: u64,
        files_found: u64,
        total_size: u64,
        current_path: String,
    },
    /// A directory could not be enumerated (or was skipped) and was kept as
    /// a degraded node.
    Degraded { path: String, status: NodeStatus },
    /// Building finished; the tree is returned by the build call.
    Complete {
        duration: Duration,
        dirs_found: u64,
        files_found: u64,
        degraded: u64,
    },
    /// Building stopped because the cancel flag was raised.
    Cancelled,
    /// Building aborted with an error.
    Failed { message: String },
}

/// Running totals shared by every worker of one build.
#[derive(Debug, Default)]
pub struct ScanCounters {
    dirs: AtomicU64,
    files: AtomicU64,
    bytes: AtomicU64,
    degraded: AtomicU64,
}

/// Snapshot of [`ScanCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
    pub degraded: u64,
}

impl ScanCounters {
    /// Count one populated directory. Returns the new directory count.
    pub fn record_dir(&self, files: u64, bytes: u64) -> u64 {
        self.files.fetch_add(files, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.dirs.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count one degraded directory.
    pub fn record_degraded(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            dirs: self.dirs.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}
