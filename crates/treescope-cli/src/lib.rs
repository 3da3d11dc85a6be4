/// TreeScope CLI: argument parsing, progress display, and report rendering
/// on top of `treescope-core`.
///
/// # Modules
///
/// - [`app`]: the command flow behind the binary.
/// - [`args`]: `clap` argument definitions.
/// - [`render`]: flat, tree, JSON and CSV reports.
/// - [`progress`]: the stderr progress line.
/// - [`logging`]: `tracing` subscriber setup.
/// - [`exit`]: process exit codes.
pub mod app;
pub mod args;
pub mod exit;
pub mod logging;
pub mod progress;
pub mod render;

pub use app::{run, write_report};
pub use args::Args;
