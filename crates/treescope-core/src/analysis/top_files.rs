/// Top-N largest files analysis.
///
/// Extracts the largest individual files from a built tree for display
/// below the directory report.

use crate::model::DirectoryNode;
use serde::Serialize;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

/// A single entry in the "largest files" results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargestFile {
    /// Full path (directory path joined with the file name).
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// Get the top N largest files from the tree, sorted by size descending.
/// Equal sizes are ordered by path, so the result never depends on sort
/// internals.
///
/// Uses `select_nth_unstable_by` (O(n) average) to bring the top-N
/// candidates to the front, then sorts only those N.
pub fn largest_files(root: &DirectoryNode, n: usize) -> Vec<LargestFile> {
    if n == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(&DirectoryNode, usize)> = root
        .flatten()
        .flat_map(|dir| (0..dir.files().len()).map(move |i| (dir, i)))
        .collect();
    let by_size = |a: &(&DirectoryNode, usize), b: &(&DirectoryNode, usize)| rank(a).cmp(&rank(b));

    if candidates.len() > n {
        candidates.select_nth_unstable_by(n - 1, by_size);
        candidates.truncate(n);
    }
    candidates.sort_unstable_by(by_size);

    candidates
        .into_iter()
        .map(|(dir, i)| {
            let file = &dir.files()[i];
            LargestFile {
                path: dir.path().join(file.name.as_str()),
                size: file.size,
            }
        })
        .collect()
}

/// Sort key: larger first, then directory path, then file name.
fn rank<'a>(&(dir, i): &(&'a DirectoryNode, usize)) -> (Reverse<u64>, &'a Path, &'a str) {
    let file = &dir.files()[i];
    (Reverse(file.size), dir.path(), file.name.as_str())
}
