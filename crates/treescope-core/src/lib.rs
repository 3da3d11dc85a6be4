/// TreeScope Core: tree building, data model, and size analysis.
///
/// This crate contains all business logic with zero rendering dependencies.
/// It is designed to be reusable across different frontends (CLI, TUI, GUI).
///
/// # Modules
///
/// - [`model`]: Owned, write-once directory tree and its pre-order iterator.
/// - [`scanner`]: Concurrent tree building with cycle detection and progress reporting.
/// - [`analysis`]: Bottom-up size aggregation, flat reports, largest files.
/// - [`error`]: The [`ScanError`] taxonomy.
pub mod analysis;
pub mod error;
pub mod model;
pub mod scanner;

pub use error::ScanError;
pub use model::{DirectoryNode, FileEntry, NodeStatus};
pub use scanner::{start_scan, ScanOptions, TreeBuilder};
