/// Command-line arguments.
use clap::{ArgAction, Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use termcolor::ColorChoice;
use treescope_core::analysis::SortKey;
use treescope_core::ScanOptions;

/// Which text rendering to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Every directory with its files, sorted by size
    #[default]
    Flat,
    /// Indented tree with proportional size bars
    Tree,
}

/// Report ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Bytes directly inside each directory
    #[default]
    Own,
    /// Bytes in the whole subtree
    Total,
    /// Tree order
    Path,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Own => SortKey::OwnSize,
            SortArg::Total => SortKey::TotalSize,
            SortArg::Path => SortKey::Path,
        }
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text (see --view)
    #[default]
    Text,
    /// JSON document with every directory row
    Json,
    /// CSV, one record per directory
    Csv,
}

/// Color output mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Resolve to a termcolor choice for stdout.
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto => {
                // Respect NO_COLOR (https://no-color.org/) and TERM=dumb.
                if std::env::var_os("NO_COLOR").is_some()
                    || std::env::var("TERM").is_ok_and(|t| t == "dumb")
                    || !std::io::stdout().is_terminal()
                {
                    ColorChoice::Never
                } else {
                    ColorChoice::Auto
                }
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "treescope")]
#[command(about = "Show where the bytes are: a directory tree sorted by size")]
#[command(version)]
pub struct Args {
    /// Directory to analyse (prompted for when omitted on a terminal)
    pub path: Option<PathBuf>,

    /// Text view: flat listing or proportional tree
    #[arg(long, value_enum, default_value = "flat")]
    pub view: View,

    /// Sort order for the flat listing and exported rows
    #[arg(short, long, value_enum, default_value = "own")]
    pub sort: SortArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,

    /// Descend only N levels deep in the tree view
    #[arg(short = 'L', long = "depth", value_name = "N")]
    pub depth: Option<u32>,

    /// Also list the N largest files
    #[arg(short = 't', long = "top", value_name = "N", default_value = "0")]
    pub top: usize,

    /// Number of parallel listing workers (0 = one per CPU)
    #[arg(short = 'j', long = "jobs", env = "TREESCOPE_JOBS", default_value = "0")]
    pub jobs: usize,

    /// Do not descend into symlinked directories
    #[arg(long = "no-follow-links")]
    pub no_follow_links: bool,

    /// Keep going when a directory disappears mid-scan
    #[arg(long = "tolerate-vanished")]
    pub tolerate_vanished: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Do not draw the progress line on stderr
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_workers: self.jobs,
            follow_links: !self.no_follow_links,
            tolerate_vanished: self.tolerate_vanished,
        }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
