/// Concurrent tree builder: the exploration engine.
///
/// Each directory is explored by one unit of work on a dedicated rayon
/// pool. A directory lists its files and subdirectories, fans out one task
/// per subdirectory, joins on all of them, and only then constructs its own
/// node from the finished children. Nothing is shared between tasks except
/// the read-only visited set and the progress counters.
///
/// # Links
///
/// A round walks real directories only; followed links to directories are
/// collected. Between rounds the collected links are sorted by canonical
/// target and claimed in that order: a target inside an existing claim
/// (the root's own subtree, a cycle, a second alias) becomes an
/// `AlreadyVisited` leaf, anything else is walked in the next round. The
/// same filesystem therefore always yields the same tree, and no canonical
/// directory is entered twice.
///
/// # Resource bound
///
/// The pool has a fixed number of threads (`ScanOptions::max_workers`, or
/// one per CPU), so at most that many listing calls are in flight no matter
/// how wide the tree is. rayon splits the per-directory fan-out lazily,
/// which keeps task creation proportional to the number of idle workers.
use crate::error::ScanError;
use crate::model::{DirectoryNode, FileEntry, NodeStatus};
use crate::scanner::lister::{DirSource, FsLister};
use crate::scanner::progress::{ScanCounters, ScanProgress};
use crate::scanner::visited::VisitedSet;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Stack size for scan workers. Recursion depth follows directory depth,
/// and work stealing can nest several explorations on one worker stack.
pub const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Send a `ScanProgress::Update` every this many populated directories.
pub const PROGRESS_INTERVAL: u64 = 256;

/// Tunables for one builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Upper bound on concurrent listing operations. `0` means one per CPU.
    pub max_workers: usize,
    /// Descend into symlinks that point at directories.
    pub follow_links: bool,
    /// Keep a subdirectory that disappears mid-scan as a degraded node
    /// instead of aborting the whole build.
    pub tolerate_vanished: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_workers: 0,
            follow_links: true,
            tolerate_vanished: false,
        }
    }
}

impl ScanOptions {
    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.max_workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_workers
        }
    }
}

/// State that lives for exactly one call to [`TreeBuilder::build`].
#[derive(Default)]
struct BuildPass {
    counters: ScanCounters,
}

/// A directory explored by a parallel round. Followed links are left
/// unresolved until the round is over.
struct Draft {
    path: PathBuf,
    status: NodeStatus,
    files: Vec<FileEntry>,
    children: Vec<DraftChild>,
}

enum DraftChild {
    Dir(Draft),
    Link(PathBuf),
}

impl Draft {
    fn degraded(path: PathBuf, status: NodeStatus) -> Self {
        Self {
            path,
            status,
            files: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Unresolved links anywhere below this draft.
    fn collect_links(&self, out: &mut Vec<PathBuf>) {
        let mut stack = vec![self];
        while let Some(draft) = stack.pop() {
            for child in &draft.children {
                match child {
                    DraftChild::Dir(dir) => stack.push(dir),
                    DraftChild::Link(path) => out.push(path.clone()),
                }
            }
        }
    }

    /// Freeze into the public tree, splicing in resolved links. Children
    /// are finished before their parent is constructed.
    fn into_node(self, resolved: &mut HashMap<PathBuf, Draft>) -> DirectoryNode {
        if self.status.is_degraded() {
            return DirectoryNode::degraded(self.path, self.status);
        }
        let children = self
            .children
            .into_iter()
            .map(|child| match child {
                DraftChild::Dir(dir) => dir.into_node(resolved),
                DraftChild::Link(path) => match resolved.remove(&path) {
                    Some(draft) => draft.into_node(resolved),
                    None => DirectoryNode::degraded(path, NodeStatus::AlreadyVisited),
                },
            })
            .collect();
        DirectoryNode::populated(self.path, children, self.files)
    }
}

pub struct TreeBuilder<S: DirSource = FsLister> {
    source: S,
    pool: rayon::ThreadPool,
    tolerate_vanished: bool,
    progress_tx: Option<Sender<ScanProgress>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TreeBuilder<FsLister> {
    /// Builder over the real filesystem.
    pub fn new(options: &ScanOptions) -> Result<Self, ScanError> {
        Self::with_source(FsLister::new(options.follow_links), options)
    }
}

impl<S: DirSource> TreeBuilder<S> {
    /// Builder over an arbitrary [`DirSource`]. `options.follow_links` is the
    /// source's business and is ignored here.
    pub fn with_source(source: S, options: &ScanOptions) -> Result<Self, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.worker_count())
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(|i| format!("treescope-scan-{i}"))
            .build()?;

        Ok(Self {
            source,
            pool,
            tolerate_vanished: options.tolerate_vanished,
            progress_tx: None,
            cancel_flag: None,
        })
    }

    /// Report progress on `tx`. Sends never block a worker; messages are
    /// dropped while the channel is full.
    pub fn with_progress(mut self, tx: Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Stop the build with [`ScanError::Cancelled`] once `flag` is set.
    /// Checked before each directory is explored.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fail fast if `root` is missing or not a directory.
    pub fn validate_root(&self, root: &Path) -> Result<(), ScanError> {
        self.source.validate_root(root)
    }

    /// Build the complete tree under `root`.
    ///
    /// Access-denied directories come back as degraded nodes. Any other
    /// failure aborts the build and is returned.
    pub fn build(&self, root: &Path) -> Result<DirectoryNode, ScanError> {
        self.validate_root(root)?;

        let start = Instant::now();
        info!(
            "Building tree for {} with {} workers",
            root.display(),
            self.worker_count()
        );

        let pass = BuildPass::default();
        let result = self.pool.install(|| self.build_rounds(root, &pass));

        let totals = pass.counters.snapshot();
        match &result {
            Ok(_) => {
                debug!(
                    "Build complete: {} dirs, {} files, {} bytes, {} degraded in {:?}",
                    totals.dirs,
                    totals.files,
                    totals.bytes,
                    totals.degraded,
                    start.elapsed()
                );
                self.notify(ScanProgress::Complete {
                    duration: start.elapsed(),
                    dirs_found: totals.dirs,
                    files_found: totals.files,
                    degraded: totals.degraded,
                });
            }
            Err(ScanError::Cancelled) => {
                info!("Build of {} cancelled", root.display());
                self.notify(ScanProgress::Cancelled);
            }
            Err(err) => {
                warn!("Build of {} failed: {err}", root.display());
                self.notify(ScanProgress::Failed {
                    message: err.to_string(),
                });
            }
        }
        result
    }

    /// Walk real directories in parallel rounds. Links found in one round
    /// are claimed in sorted target order before the next round explores
    /// them, so the tree does not depend on scheduling.
    fn build_rounds(&self, root: &Path, pass: &BuildPass) -> Result<DirectoryNode, ScanError> {
        let mut visited = VisitedSet::new();
        let canonical_root = self.canonical_or_raw(root);
        visited.claim(canonical_root.clone());

        let main = self.explore(root.to_path_buf(), canonical_root, &visited, pass)?;
        let mut pending = Vec::new();
        main.collect_links(&mut pending);

        let mut resolved: HashMap<PathBuf, Draft> = HashMap::new();
        let mut round = 0;
        while !pending.is_empty() {
            if self.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            round += 1;

            let mut candidates: Vec<(PathBuf, PathBuf)> = pending
                .drain(..)
                .map(|link| (self.canonical_or_raw(&link), link))
                .collect();
            candidates.sort();

            let mut accepted = Vec::new();
            for (target, link) in candidates {
                if visited.claim(target.clone()) {
                    accepted.push((link, target));
                } else {
                    debug!("Not re-entering {} via {}", target.display(), link.display());
                    self.record_degraded(&link, NodeStatus::AlreadyVisited, pass);
                    resolved.insert(link.clone(), Draft::degraded(link, NodeStatus::AlreadyVisited));
                }
            }
            debug!("Link round {round}: following {} links", accepted.len());

            let drafts = accepted
                .into_par_iter()
                .map(|(link, target)| self.explore(link, target, &visited, pass))
                .collect::<Result<Vec<_>, _>>()?;
            for draft in drafts {
                draft.collect_links(&mut pending);
                resolved.insert(draft.path.clone(), draft);
            }
        }

        Ok(main.into_node(&mut resolved))
    }

    /// Explore one real directory and its real subtree. `canonical` is the
    /// canonical form of `path`.
    fn explore(
        &self,
        path: PathBuf,
        canonical: PathBuf,
        visited: &VisitedSet,
        pass: &BuildPass,
    ) -> Result<Draft, ScanError> {
        if self.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        // Files first: a denied file listing is what marks the node degraded.
        let files = match self.source.list_files(&path) {
            Ok(files) => files,
            Err(err) => return self.degrade(path, err, pass),
        };
        let subdirs = match self.source.list_subdirectories(&path) {
            Ok(dirs) => dirs,
            Err(err) => return self.degrade(path, err, pass),
        };

        // Fan out, then join. The indexed collect keeps enumeration order.
        let children = subdirs
            .into_par_iter()
            .map(|child| {
                if self.source.is_link(&child) {
                    return Ok(DraftChild::Link(child));
                }
                let child_canonical = match child.file_name() {
                    Some(name) => canonical.join(name),
                    None => child.clone(),
                };
                if visited.is_claim_root(&child_canonical) {
                    debug!("{} is walked through another path", child.display());
                    self.record_degraded(&child, NodeStatus::AlreadyVisited, pass);
                    return Ok(DraftChild::Dir(Draft::degraded(
                        child,
                        NodeStatus::AlreadyVisited,
                    )));
                }
                self.explore(child, child_canonical, visited, pass)
                    .map(DraftChild::Dir)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bytes: u64 = files.iter().map(|f| f.size).sum();
        let dirs_found = pass.counters.record_dir(files.len() as u64, bytes);
        if dirs_found.is_multiple_of(PROGRESS_INTERVAL) {
            let totals = pass.counters.snapshot();
            self.notify(ScanProgress::Update {
                dirs_found: totals.dirs,
                files_found: totals.files,
                total_size: totals.bytes,
                current_path: path.to_string_lossy().into_owned(),
            });
        }

        Ok(Draft {
            path,
            status: NodeStatus::Ok,
            files,
            children,
        })
    }

    /// Canonical form of `path`, or `path` itself when it cannot be resolved;
    /// the listing then reports the real error.
    fn canonical_or_raw(&self, path: &Path) -> PathBuf {
        match self.source.canonicalize(path) {
            Ok(canonical) => canonical,
            Err(err) => {
                trace!("canonicalize {} failed: {err}", path.display());
                path.to_path_buf()
            }
        }
    }

    /// Turn a recoverable listing failure of `path` into a degraded node;
    /// return any other failure unchanged.
    fn degrade(&self, path: PathBuf, err: ScanError, pass: &BuildPass) -> Result<Draft, ScanError> {
        let status = match err {
            ScanError::AccessDenied { .. } => NodeStatus::AccessDenied,
            ScanError::Vanished { .. } if self.tolerate_vanished => NodeStatus::Vanished,
            other => return Err(other),
        };
        warn!("{}: {}", status.label(), path.display());
        self.record_degraded(&path, status, pass);
        Ok(Draft::degraded(path, status))
    }

    fn record_degraded(&self, path: &Path, status: NodeStatus, pass: &BuildPass) {
        pass.counters.record_degraded();
        self.notify(ScanProgress::Degraded {
            path: path.to_string_lossy().into_owned(),
            status,
        });
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn notify(&self, msg: ScanProgress) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.try_send(msg);
        }
    }
}
