/// Flat, sorted listing of every directory in a tree.
use super::aggregate::SizeIndex;
use crate::model::NodeStatus;
use serde::Serialize;
use std::path::PathBuf;

/// Ordering for [`flat_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Bytes of the files directly in the directory, largest first.
    #[default]
    OwnSize,
    /// Bytes of the whole subtree, largest first.
    TotalSize,
    /// Tree (pre-order) order.
    Path,
}

/// One line of the flat report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Pre-order position in the tree; use with [`SizeIndex::entries`].
    #[serde(skip)]
    pub index: usize,
    pub path: PathBuf,
    pub status: NodeStatus,
    pub depth: u32,
    pub own_size: u64,
    pub total_size: u64,
    pub file_count: u64,
    /// `total_size` is a lower bound because something below was unreadable.
    pub incomplete: bool,
}

/// Every node of the indexed tree, sorted by `key`.
///
/// Size keys sort descending; ties keep tree order.
pub fn flat_report(index: &SizeIndex<'_>, key: SortKey) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = index
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| ReportRow {
            index: i,
            path: e.node.path().to_path_buf(),
            status: e.node.status(),
            depth: e.depth,
            own_size: e.own_size,
            total_size: e.total_size,
            file_count: e.file_count,
            incomplete: e.incomplete,
        })
        .collect();

    match key {
        SortKey::OwnSize => rows.sort_by(|a, b| b.own_size.cmp(&a.own_size)),
        SortKey::TotalSize => rows.sort_by(|a, b| b.total_size.cmp(&a.total_size)),
        SortKey::Path => {}
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DirectoryNode, FileEntry};

    fn dir(path: &str, size: u64) -> DirectoryNode {
        DirectoryNode::populated(path, vec![], vec![FileEntry::new("f", size)])
    }

    #[test]
    fn test_sort_by_own_size() {
        let tree = DirectoryNode::populated(
            "/r",
            vec![dir("/r/small", 5), dir("/r/big", 500), dir("/r/mid", 50)],
            vec![],
        );
        let index = SizeIndex::compute(&tree);
        let rows = flat_report(&index, SortKey::OwnSize);

        let order: Vec<_> = rows.iter().map(|r| r.path.to_str().unwrap()).collect();
        assert_eq!(order, vec!["/r/big", "/r/mid", "/r/small", "/r"]);
        assert_eq!(rows[3].total_size, 555);
    }

    #[test]
    fn test_sort_by_total_size_and_ties() {
        let tree = DirectoryNode::populated(
            "/r",
            vec![
                DirectoryNode::populated("/r/a", vec![dir("/r/a/x", 10)], vec![]),
                dir("/r/b", 10),
            ],
            vec![],
        );
        let index = SizeIndex::compute(&tree);
        let rows = flat_report(&index, SortKey::TotalSize);
        let order: Vec<_> = rows.iter().map(|r| r.path.to_str().unwrap()).collect();
        // Equal totals keep pre-order.
        assert_eq!(order, vec!["/r", "/r/a", "/r/a/x", "/r/b"]);

        let tree_order = flat_report(&index, SortKey::Path);
        assert_eq!(tree_order[1].path.to_str(), Some("/r/a"));
        assert_eq!(tree_order[1].depth, 1);
    }

    #[test]
    fn test_row_serializes() {
        let tree = dir("/r", 3);
        let index = SizeIndex::compute(&tree);
        let rows = flat_report(&index, SortKey::Path);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["own_size"], 3);
        assert!(json.get("index").is_none());
    }
}
