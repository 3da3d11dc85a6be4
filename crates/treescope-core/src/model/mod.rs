/// Data model for the TreeScope directory tree.
///
/// Re-exports the owned tree node and its pre-order iterator.
pub mod dir_node;
pub mod flatten;

pub use dir_node::{DirectoryNode, FileEntry, NodeStatus};
pub use flatten::Flatten;
