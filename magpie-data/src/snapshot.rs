//! Snapshot helpers: one serde value per JSON file.
//!
//! Snapshots are write-once: `dump` refuses to replace an existing file so
//! that a mistyped path can never clobber an earlier run's data.

use crate::error::{Result, SnapshotError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

/// Serialize `value` to a new file at `path`.
///
/// # Errors
///
/// Fails with [`SnapshotError::AlreadyExists`] if `path` is occupied;
/// nothing is written in that case.
pub fn dump<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => SnapshotError::AlreadyExists(path.display().to_string()),
            _ => SnapshotError::Io(e),
        })?;

    serde_json::to_writer(BufWriter::new(file), value).map_err(SnapshotError::Json)?;
    Ok(())
}

/// Deserialize a value from the file at `path`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path).map_err(SnapshotError::Io)?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(SnapshotError::Json)?;
    Ok(value)
}
