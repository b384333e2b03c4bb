//! Snapshot persistence.
//!
//! Plain overwrite: a failure mid-write can leave a truncated file behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use common::{Error, FetchStats, Result, Snapshot};
use tracing::{error, info};

/// Serialize `snapshot` as 2-space indented JSON to `path`, replacing any
/// previous snapshot there.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot, stats: &FetchStats) -> Result<()> {
    if let Err(e) = write_json(path, snapshot) {
        error!("Error saving data to {}: {}", path.display(), e);
        return Err(e);
    }

    info!("Successfully saved data to {}", path.display());
    info!(
        "Summary: {} successful fetches, {} failed fetches",
        stats.successful, stats.failed
    );
    Ok(())
}

fn write_json(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, snapshot).map_err(|e| {
        if e.is_io() {
            Error::io(path, e.into())
        } else {
            Error::Json(e)
        }
    })?;
    out.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    out.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}
