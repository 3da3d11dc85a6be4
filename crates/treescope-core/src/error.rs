/// Error taxonomy for tree building.
///
/// Only [`ScanError::AccessDenied`] is ever recovered locally (the builder
/// turns it into a degraded node). Every other variant aborts the build and
/// reaches the caller.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The root does not exist or is not a directory. Raised before any
    /// concurrent work starts.
    #[error("invalid root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// Enumerating a directory was refused by the OS.
    #[error("access denied: {}", path.display())]
    AccessDenied { path: PathBuf },

    /// A path disappeared between being listed and being entered.
    #[error("path vanished during scan: {}", path.display())]
    Vanished { path: PathBuf },

    /// Any other I/O failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The build observed its cancellation flag.
    #[error("scan cancelled")]
    Cancelled,

    #[error("failed to build scan worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("scanner thread panicked")]
    WorkerPanicked,
}

impl ScanError {
    /// Classify an I/O error raised while working on `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => Self::Vanished {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    #[inline]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    #[inline]
    pub fn is_vanished(&self) -> bool {
        matches!(self, Self::Vanished { .. })
    }
}
