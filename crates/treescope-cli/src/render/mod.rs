/// Report renderers: everything that turns a built tree into text.
///
/// - [`flat`]: one block per directory, sorted by size.
/// - [`tree`]: indented tree with proportional size bars.
/// - [`export`]: JSON and CSV reports.
/// - [`size`]: byte and count formatting.
///
/// Text renderers write to any `termcolor::WriteColor`, so tests render
/// into an uncoloured buffer and the binary renders into stdout.
pub mod export;
pub mod flat;
pub mod size;
pub mod tree;

pub use export::{write_csv, write_json, JsonReport};
pub use flat::{render_flat, render_largest_files};
pub use size::{format_count, format_size, format_size_bound};
pub use tree::{render_tree, TreeViewOptions};

use std::io;
use termcolor::{Color, ColorSpec, WriteColor};
use thiserror::Error;
use treescope_core::NodeStatus;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl RenderError {
    /// The reader of our output went away, whichever encoder noticed it.
    pub fn is_broken_pipe(&self) -> bool {
        let kind = match self {
            RenderError::Io(err) => Some(err.kind()),
            RenderError::Json(err) => err.io_error_kind(),
            RenderError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(err) => Some(err.kind()),
                _ => None,
            },
        };
        kind == Some(io::ErrorKind::BrokenPipe)
    }
}

/// Write `text` in `color`, then reset.
pub(crate) fn write_colored(
    out: &mut dyn WriteColor,
    color: Color,
    bold: bool,
    text: &str,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(out, "{text}")?;
    out.reset()
}

/// Bracketed marker for degraded nodes, written in yellow. Nothing for `Ok`.
pub(crate) fn write_status_marker(out: &mut dyn WriteColor, status: NodeStatus) -> io::Result<()> {
    if status.is_degraded() {
        write_colored(out, Color::Yellow, false, &format!(" [{}]", status.label()))?;
    }
    Ok(())
}
