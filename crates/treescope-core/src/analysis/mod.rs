/// Analysis modules: post-build aggregation and reports.

pub mod aggregate;
pub mod report;
pub mod top_files;

pub use aggregate::{total_size, SizeIndex, SizedNode};
pub use report::{flat_report, ReportRow, SortKey};
pub use top_files::{largest_files, LargestFile};
