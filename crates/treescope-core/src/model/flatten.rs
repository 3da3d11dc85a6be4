/// Pre-order flattening of a `DirectoryNode` tree.
///
/// Uses an explicit stack instead of recursion, so very deep trees cannot
/// overflow the caller's stack while iterating.
use super::dir_node::DirectoryNode;

/// Iterator returned by [`DirectoryNode::flatten`].
#[derive(Clone, Debug)]
pub struct Flatten<'a> {
    stack: Vec<&'a DirectoryNode>,
}

impl<'a> Flatten<'a> {
    pub(crate) fn new(root: &'a DirectoryNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a DirectoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse push so the first child is popped next.
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl std::iter::FusedIterator for Flatten<'_> {}

#[cfg(test)]
mod tests {
    use crate::model::{DirectoryNode, FileEntry};
    use std::path::Path;

    fn leaf(path: &str) -> DirectoryNode {
        DirectoryNode::populated(path, vec![], vec![])
    }

    #[test]
    fn test_preorder() {
        // r -> (a -> (a1, a2), b)
        let tree = DirectoryNode::populated(
            "/r",
            vec![
                DirectoryNode::populated("/r/a", vec![leaf("/r/a/1"), leaf("/r/a/2")], vec![]),
                leaf("/r/b"),
            ],
            vec![FileEntry::new("x", 1)],
        );

        let order: Vec<&Path> = tree.flatten().map(|n| n.path()).collect();
        assert_eq!(
            order,
            vec![
                Path::new("/r"),
                Path::new("/r/a"),
                Path::new("/r/a/1"),
                Path::new("/r/a/2"),
                Path::new("/r/b"),
            ]
        );
    }

    #[test]
    fn test_restartable() {
        let tree = DirectoryNode::populated("/r", vec![leaf("/r/a"), leaf("/r/b")], vec![]);
        let first: Vec<_> = tree.flatten().map(|n| n.path().to_path_buf()).collect();
        let second: Vec<_> = tree.flatten().map(|n| n.path().to_path_buf()).collect();
        assert_eq!(first, second);
        assert_eq!(tree.count_nodes(), 3);
    }

    #[test]
    fn test_single_node() {
        let tree = leaf("/r");
        let mut it = tree.flatten();
        assert_eq!(it.next().map(|n| n.path()), Some(Path::new("/r")));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
