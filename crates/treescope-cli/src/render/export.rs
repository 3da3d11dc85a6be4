/// Machine-readable reports: JSON document or CSV rows.
use super::RenderError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use treescope_core::analysis::{LargestFile, ReportRow, SizeIndex};

/// Top-level JSON document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub total_size: u64,
    /// `total_size` is a lower bound when this is `true`.
    pub incomplete: bool,
    pub degraded: usize,
    pub directories: &'a [ReportRow],
    #[serde(skip_serializing_if = "no_files")]
    pub largest_files: &'a [LargestFile],
}

impl<'a> JsonReport<'a> {
    pub fn new(index: &SizeIndex<'_>, rows: &'a [ReportRow], largest: &'a [LargestFile]) -> Self {
        let root = index.root();
        Self {
            root: root.node.path().to_path_buf(),
            generated_at: Utc::now(),
            total_size: root.total_size,
            incomplete: root.incomplete,
            degraded: index.degraded_count(),
            directories: rows,
            largest_files: largest,
        }
    }
}

fn no_files(files: &&[LargestFile]) -> bool {
    files.is_empty()
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut out: W, report: &JsonReport<'_>) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

/// One CSV record per directory, with a header row.
pub fn write_csv<W: Write>(out: W, rows: &[ReportRow]) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
