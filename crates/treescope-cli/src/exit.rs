//! Process exit codes (BSD sysexits.h compatible where one fits)

use treescope_core::ScanError;

/// Successful termination, including builds with degraded subtrees
pub const OK: u8 = 0;

/// Anything not covered below (e.g. stdout closed)
pub const FAILURE: u8 = 1;

/// Root path missing or not a directory
pub const NOINPUT: u8 = 66;

/// Internal software error (worker pool, panicked scanner)
pub const SOFTWARE: u8 = 70;

/// Input/output error, including paths that vanished mid-scan
pub const IOERR: u8 = 74;

/// Exit code for a scan failure.
pub fn for_scan_error(err: &ScanError) -> u8 {
    match err {
        ScanError::InvalidRoot { .. } => NOINPUT,
        // Denied directories are degraded nodes; this only arrives if a
        // listing error escapes the builder.
        ScanError::AccessDenied { .. } | ScanError::Vanished { .. } | ScanError::Io { .. } => {
            IOERR
        }
        // The binary never sets a cancel flag.
        ScanError::Cancelled => FAILURE,
        ScanError::ThreadPool(_) | ScanError::Spawn(_) | ScanError::WorkerPanicked => SOFTWARE,
    }
}

/// Exit code for any error surfaced by `run`.
pub fn for_error(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ScanError>())
        .map(for_scan_error)
        .unwrap_or(FAILURE)
}
