/// Bottom-up size aggregation in a single O(n) pass.
///
/// The tree is flattened once in pre-order. Because every child follows
/// its parent in that order, iterating in *reverse* guarantees each child is
/// finished before its parent, so each node's total is added to its
/// parent exactly once. No recursion and no repeated subtree walks.
///
/// # Undercounting
///
/// Degraded nodes (access denied, vanished, already visited) contribute 0
/// bytes. Totals above them are therefore lower bounds; every such total is
/// flagged `incomplete` so reports can say so.
use crate::model::DirectoryNode;

/// Aggregated figures for one directory.
#[derive(Debug, Clone, Copy)]
pub struct SizedNode<'a> {
    pub node: &'a DirectoryNode,
    /// Pre-order position of the parent, `None` for the root.
    pub parent: Option<usize>,
    /// Distance from the root (root = 0).
    pub depth: u32,
    /// Sum of the files directly in this directory.
    pub own_size: u64,
    /// Sum of every file in this subtree.
    pub total_size: u64,
    /// Number of files in this subtree.
    pub file_count: u64,
    /// Number of directories in this subtree, including this one.
    pub dir_count: u64,
    /// This node or a descendant is degraded, so `total_size` undercounts.
    pub incomplete: bool,
}

/// Sizes for every node of one tree, indexed in pre-order.
#[derive(Debug, Clone)]
pub struct SizeIndex<'a> {
    entries: Vec<SizedNode<'a>>,
}

impl<'a> SizeIndex<'a> {
    /// Aggregate sizes for `root` and all of its descendants.
    pub fn compute(root: &'a DirectoryNode) -> Self {
        // Pre-order walk with parent links. The stack carries the parent's
        // position so children can point back at it.
        let mut entries: Vec<SizedNode<'a>> = Vec::new();
        let mut stack: Vec<(&'a DirectoryNode, Option<usize>, u32)> = vec![(root, None, 0)];
        while let Some((node, parent, depth)) = stack.pop() {
            let own_size = node.own_size();
            let idx = entries.len();
            entries.push(SizedNode {
                node,
                parent,
                depth,
                own_size,
                total_size: own_size,
                file_count: node.files().len() as u64,
                dir_count: 1,
                incomplete: node.is_degraded(),
            });
            for child in node.children().iter().rev() {
                stack.push((child, Some(idx), depth + 1));
            }
        }

        // Reverse pass: children before parents.
        for i in (1..entries.len()).rev() {
            let SizedNode {
                parent,
                total_size,
                file_count,
                dir_count,
                incomplete,
                ..
            } = entries[i];
            if let Some(p) = parent {
                let parent = &mut entries[p];
                parent.total_size += total_size;
                parent.file_count += file_count;
                parent.dir_count += dir_count;
                parent.incomplete |= incomplete;
            }
        }

        Self { entries }
    }

    /// Figures for the root.
    pub fn root(&self) -> &SizedNode<'a> {
        &self.entries[0]
    }

    /// Total bytes under the root.
    pub fn total_size(&self) -> u64 {
        self.root().total_size
    }

    /// Number of degraded nodes anywhere in the tree.
    pub fn degraded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.node.is_degraded()).count()
    }

    /// All nodes in pre-order (same order as [`DirectoryNode::flatten`]).
    pub fn entries(&self) -> &[SizedNode<'a>] {
        &self.entries
    }

    /// Entries for the direct children of the entry at `index`, in
    /// `children` order.
    pub fn children_of(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.entries[index].node.children().len());
        let mut next = index + 1;
        while next < self.entries.len() && self.entries[next].parent == Some(index) {
            out.push(next);
            next += self.entries[next].dir_count as usize;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: an index holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Total bytes of every file reachable from `node`.
///
/// Convenient for a single query. Anything that needs sizes for many nodes
/// (sorting, rendering) should build one [`SizeIndex`] instead of calling
/// this per node.
pub fn total_size(node: &DirectoryNode) -> u64 {
    node.own_size() + node.children().iter().map(total_size).sum::<u64>()
}
