/// One-level directory listing: the only code that touches the filesystem.
///
/// [`DirSource`] is the seam between the tree builder and the OS: the
/// builder never calls `std::fs` directly, so it can be driven by an
/// in-memory source in tests. [`FsLister`] is the real implementation.
use crate::error::ScanError;
use crate::model::FileEntry;
use compact_str::CompactString;
use std::fs::{self, DirEntry, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only, stateless directory enumeration.
///
/// Errors returned by the listing methods always describe `path` itself.
/// Trouble with a single entry (a link whose target cannot be resolved, a
/// file removed between listing and `stat`) is settled per entry and never
/// fails the listing.
pub trait DirSource: Sync {
    /// Immediate subdirectories of `path`, in enumeration order.
    ///
    /// Access denied on `path` itself yields an empty list, indistinguishable
    /// at this layer from a directory without subdirectories. Every other
    /// failure is returned.
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>, ScanError>;

    /// Immediate non-directory entries of `path` with their sizes.
    ///
    /// Unlike [`DirSource::list_subdirectories`], access denied is reported
    /// as [`ScanError::AccessDenied`]; the builder relies on this to mark
    /// the node as degraded.
    fn list_files(&self, path: &Path) -> Result<Vec<FileEntry>, ScanError>;

    /// Whether `path` is a symbolic link (not followed).
    fn is_link(&self, path: &Path) -> bool;

    /// Resolve `path` to its canonical form (links followed).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Check that `path` exists and is a directory.
    fn validate_root(&self, path: &Path) -> Result<(), ScanError>;
}

/// How one directory entry is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File(u64),
    /// Removed between the listing and the `stat`.
    Gone,
}

/// [`DirSource`] backed by `std::fs`.
#[derive(Clone, Copy, Debug)]
pub struct FsLister {
    follow_links: bool,
}

impl Default for FsLister {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FsLister {
    /// With `follow_links`, a symlink that resolves to a directory is listed
    /// as a subdirectory. Without it, symlinks are reported as files and
    /// never descended.
    pub fn new(follow_links: bool) -> Self {
        Self { follow_links }
    }

    fn classify(&self, entry: &DirEntry) -> Result<EntryKind, ScanError> {
        let entry_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(EntryKind::Gone),
            Err(err) => {
                return Err(ScanError::Io {
                    path: entry_path,
                    source: err,
                })
            }
        };
        if file_type.is_dir() {
            return Ok(EntryKind::Dir);
        }
        if file_type.is_symlink() && self.follow_links {
            match fs::metadata(&entry_path) {
                Ok(meta) if meta.is_dir() => return Ok(EntryKind::Dir),
                Ok(meta) => return Ok(EntryKind::File(meta.len())),
                // Dangling, denied or looping target: count the link itself.
                Err(err) => debug!("Not following {}: {err}", entry_path.display()),
            }
        }
        file_kind(&entry_path, entry.metadata())
    }

    fn entries(&self, path: &Path) -> Result<Vec<(DirEntry, EntryKind)>, ScanError> {
        let read_dir = fs::read_dir(path).map_err(|e| ScanError::from_io(path, e))?;
        let mut out = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| ScanError::from_io(path, e))?;
            let kind = self.classify(&entry)?;
            out.push((entry, kind));
        }
        Ok(out)
    }
}

/// Count a non-directory entry from its own metadata. Only failures other
/// than "gone" and "denied" are errors, and they name the entry.
fn file_kind(entry_path: &Path, meta: io::Result<Metadata>) -> Result<EntryKind, ScanError> {
    match meta {
        Ok(meta) => Ok(EntryKind::File(meta.len())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} removed during scan", entry_path.display());
            Ok(EntryKind::Gone)
        }
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            warn!("Size of {} unreadable, counted as 0", entry_path.display());
            Ok(EntryKind::File(0))
        }
        Err(err) => Err(ScanError::Io {
            path: entry_path.to_path_buf(),
            source: err,
        }),
    }
}

impl DirSource for FsLister {
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        match self.entries(path) {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter(|(_, kind)| *kind == EntryKind::Dir)
                .map(|(entry, _)| entry.path())
                .collect()),
            Err(err) if err.is_access_denied() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    fn list_files(&self, path: &Path) -> Result<Vec<FileEntry>, ScanError> {
        Ok(self
            .entries(path)?
            .into_iter()
            .filter_map(|(entry, kind)| match kind {
                EntryKind::File(size) => Some(FileEntry {
                    name: CompactString::new(entry.file_name().to_string_lossy()),
                    size,
                }),
                EntryKind::Dir | EntryKind::Gone => None,
            })
            .collect())
    }

    fn is_link(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn validate_root(&self, path: &Path) -> Result<(), ScanError> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "not a directory".into(),
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ScanError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "no such file or directory".into(),
            }),
            Err(err) => Err(ScanError::InvalidRoot {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
}
