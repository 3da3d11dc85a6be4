/// Single-line progress display on stderr, fed by the scan's progress
/// channel.
use crate::render::{format_count, format_size};
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::time::Duration;
use treescope_core::scanner::ScanProgress;

/// Longest path fragment shown on the progress line.
const MAX_PATH_CHARS: usize = 50;

/// What the progress stream said by the time it disconnected.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Paths reported as degraded, in arrival order.
    pub degraded: Vec<String>,
    pub duration: Option<Duration>,
}

/// Drain `rx` until the build disconnects it. When `out` is given, each
/// update rewrites one line on it; the line is cleared at the end.
pub fn drain(rx: &Receiver<ScanProgress>, mut out: Option<&mut dyn Write>) -> ProgressSummary {
    let mut summary = ProgressSummary::default();
    let mut drew = false;

    for msg in rx.iter() {
        match msg {
            ScanProgress::Update {
                dirs_found,
                files_found,
                total_size,
                current_path,
            } => {
                if let Some(out) = out.as_deref_mut() {
                    let line = format!(
                        "Scanning... {} dirs, {} files, {}  {}",
                        format_count(dirs_found),
                        format_count(files_found),
                        format_size(total_size),
                        truncate_path(&current_path, MAX_PATH_CHARS)
                    );
                    // Progress is cosmetic; a failed write is not worth aborting for.
                    let _ = write!(out, "\r\x1b[2K{line}");
                    let _ = out.flush();
                    drew = true;
                }
            }
            ScanProgress::Degraded { path, .. } => summary.degraded.push(path),
            ScanProgress::Complete { duration, .. } => summary.duration = Some(duration),
            ScanProgress::Cancelled | ScanProgress::Failed { .. } => {}
        }
    }

    if drew {
        if let Some(out) = out.as_deref_mut() {
            let _ = write!(out, "\r\x1b[2K");
            let _ = out.flush();
        }
    }
    summary
}

/// Keep the tail of `path` so the most specific part stays visible.
fn truncate_path(path: &str, max_chars: usize) -> String {
    let count = path.chars().count();
    if count <= max_chars {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - max_chars + 3).collect();
    format!("...{tail}")
}

/// Progress goes to stderr only when it is an interactive terminal.
pub fn stderr_is_interactive() -> bool {
    use std::io::IsTerminal;
    io::stderr().is_terminal()
}
