/// Scanner module: builds the directory tree.
///
/// - [`lister`]: one-level directory listing behind the [`DirSource`] seam.
/// - [`builder`]: the concurrent fan-out/fan-in [`TreeBuilder`].
/// - [`visited`]: per-build canonical-path set that breaks link cycles.
/// - [`progress`]: progress messages and counters.
///
/// [`TreeBuilder::build`] is synchronous. [`start_scan`] runs it on a
/// background thread so a frontend can render progress while it works.
pub mod builder;
pub mod lister;
pub mod progress;
pub mod visited;

pub use builder::{ScanOptions, TreeBuilder, PROGRESS_INTERVAL, WORKER_STACK_SIZE};
pub use lister::{DirSource, FsLister};
pub use progress::ScanProgress;
pub use visited::VisitedSet;

use crate::error::ScanError;
use crate::model::DirectoryNode;
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

/// Maximum number of progress messages that may queue up in the channel.
///
/// Workers never block on a full channel; surplus updates are dropped. The
/// terminal message is sent after every worker has finished, so it is only
/// lost if the receiver stopped draining.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running or completed background build.
pub struct ScanHandle {
    /// Receiver for progress updates. Disconnects when the build finishes.
    pub progress_rx: Receiver<ScanProgress>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    thread: thread::JoinHandle<Result<DirectoryNode, ScanError>>,
}

impl ScanHandle {
    /// Request the build to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Block until the build finishes and take its result.
    pub fn wait(self) -> Result<DirectoryNode, ScanError> {
        self.thread.join().map_err(|_| ScanError::WorkerPanicked)?
    }
}

/// Start building the tree for `root_path` on a background thread.
///
/// The root is validated before the thread is spawned, so an invalid root
/// is reported here rather than through the handle.
pub fn start_scan(root_path: PathBuf, options: &ScanOptions) -> Result<ScanHandle, ScanError> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));

    let builder = TreeBuilder::new(options)?
        .with_progress(progress_tx)
        .with_cancel_flag(cancel_flag.clone());
    builder.validate_root(&root_path)?;

    let thread = thread::Builder::new()
        .name("treescope-scanner".into())
        .spawn(move || {
            info!("Starting scan of {}", root_path.display());
            builder.build(&root_path)
        })
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        progress_rx,
        cancel_flag,
        thread,
    })
}
