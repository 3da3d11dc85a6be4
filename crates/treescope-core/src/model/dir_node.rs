/// A single directory in the owned, write-once directory tree.
///
/// Nodes own their children directly (`Vec<DirectoryNode>`), so a finished
/// tree has exactly one owner per node and no interior mutability. All
/// fields are private and only set by the two constructors: a child is
/// always fully built before it is moved into its parent.
use compact_str::CompactString;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::flatten::Flatten;

/// Outcome of enumerating one directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Fully enumerated.
    Ok,
    /// The OS refused to list the directory. The node is kept, empty, so
    /// callers can see where the scan went blind.
    AccessDenied,
    /// The directory's canonical path was already entered earlier in the
    /// same build (symlink cycle or duplicate link); it is not re-entered.
    AlreadyVisited,
    /// The directory disappeared mid-scan and the build was configured to
    /// tolerate that.
    Vanished,
}

impl NodeStatus {
    /// `true` for every status other than [`NodeStatus::Ok`].
    #[inline]
    pub fn is_degraded(self) -> bool {
        self != Self::Ok
    }

    /// Short label for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::AccessDenied => "access denied",
            Self::AlreadyVisited => "already visited",
            Self::Vanished => "vanished",
        }
    }
}

/// A regular file (or any non-directory entry) directly inside a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// File name only, not the full path.
    pub name: CompactString,
    /// Logical size in bytes.
    pub size: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<CompactString>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryNode {
    path: PathBuf,
    status: NodeStatus,
    children: Vec<DirectoryNode>,
    files: Vec<FileEntry>,
}

impl DirectoryNode {
    /// A fully enumerated directory. `children` and `files` keep the order
    /// the listing primitives returned them in.
    pub fn populated(
        path: impl Into<PathBuf>,
        children: Vec<DirectoryNode>,
        files: Vec<FileEntry>,
    ) -> Self {
        Self {
            path: path.into(),
            status: NodeStatus::Ok,
            children,
            files,
        }
    }

    /// A directory that could not be enumerated. Always empty.
    pub fn degraded(path: impl Into<PathBuf>, status: NodeStatus) -> Self {
        debug_assert!(status.is_degraded(), "degraded node built with Ok status");
        Self {
            path: path.into(),
            status,
            children: Vec::new(),
            files: Vec::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }

    #[inline]
    pub fn children(&self) -> &[DirectoryNode] {
        &self.children
    }

    #[inline]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Sum of the sizes of the files directly in this directory.
    pub fn own_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Depth-first pre-order walk over this node and every descendant.
    ///
    /// The iterator borrows the tree and never mutates it, so it can be
    /// recreated any number of times and always yields the same sequence.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten::new(self)
    }

    /// Number of directories in this subtree, including this one.
    pub fn count_nodes(&self) -> usize {
        self.flatten().count()
    }

    /// Display name: the last path component, or the whole path for roots
    /// like `/` or `.`.
    pub fn name(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.path.to_string_lossy().into_owned(),
        }
    }
}
