/// Command flow: resolve the root, build the tree with a progress line,
/// then write the requested report to stdout.
use crate::args::{Args, Format, View};
use crate::progress;
use crate::render::{self, JsonReport, RenderError, TreeViewOptions};
use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use termcolor::{StandardStream, WriteColor};
use tracing::{debug, info, warn};
use treescope_core::analysis::{flat_report, largest_files, SizeIndex};
use treescope_core::{start_scan, DirectoryNode};

pub fn run(args: &Args) -> Result<()> {
    let root = resolve_root(args.path.clone())?;
    let handle = start_scan(root.clone(), &args.scan_options())
        .with_context(|| format!("cannot scan {}", root.display()))?;

    let summary = if !args.no_progress && progress::stderr_is_interactive() {
        let mut stderr = io::stderr();
        progress::drain(&handle.progress_rx, Some(&mut stderr))
    } else {
        progress::drain(&handle.progress_rx, None)
    };

    let tree = handle
        .wait()
        .with_context(|| format!("scan of {} failed", root.display()))?;
    if let Some(duration) = summary.duration {
        info!(
            "Scanned {} directories in {:.2}s",
            tree.count_nodes(),
            duration.as_secs_f64()
        );
    }
    for path in &summary.degraded {
        debug!("Incomplete subtree: {path}");
    }

    let mut out = StandardStream::stdout(args.color.choice());
    match write_report(&mut out, args, &tree) {
        // The reader went away (`treescope | head`); nothing left to say.
        Err(err) if err.is_broken_pipe() => Ok(()),
        result => result.context("failed to write report"),
    }
}

/// Render `tree` in the format and view selected by `args`.
pub fn write_report(
    out: &mut dyn WriteColor,
    args: &Args,
    tree: &DirectoryNode,
) -> Result<(), RenderError> {
    let index = SizeIndex::compute(tree);
    let rows = flat_report(&index, args.sort.into());
    let largest = largest_files(tree, args.top);

    match args.format {
        Format::Json => render::write_json(&mut *out, &JsonReport::new(&index, &rows, &largest))?,
        Format::Csv => render::write_csv(&mut *out, &rows)?,
        Format::Text => {
            match args.view {
                View::Flat => render::render_flat(out, &index, &rows)?,
                View::Tree => {
                    let options = TreeViewOptions {
                        max_depth: args.depth,
                        ..TreeViewOptions::default()
                    };
                    render::render_tree(out, &index, &options)?;
                }
            }
            render::render_largest_files(out, &largest)?;
        }
    }
    out.flush()?;

    let degraded = index.degraded_count();
    if degraded > 0 {
        warn!(
            "{degraded} director{} could not be read; totals are lower bounds",
            if degraded == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

/// Use the given path; otherwise ask on a terminal, defaulting to `$HOME`.
fn resolve_root(path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = path {
        return Ok(path);
    }
    if !io::stdin().is_terminal() {
        return Ok(PathBuf::from("."));
    }

    let default = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let input: String = dialoguer::Input::new()
        .with_prompt("Directory to analyse")
        .default(default)
        .interact_text()
        .context("failed to read a directory from the terminal")?;
    Ok(PathBuf::from(input.trim()))
}
