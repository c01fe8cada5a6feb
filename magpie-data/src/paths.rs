//! Unique-path helpers for log files and run directories.

use crate::error::{PathError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Highest numbered suffix tried before giving up.
const MAX_SUFFIX: u32 = 100;

/// Find an unoccupied path for `filename` inside `dir`.
///
/// Returns `dir/filename` when free; otherwise tries `stem_2.ext` through
/// `stem_100.ext` against the directory listing.
///
/// # Errors
///
/// Fails with [`PathError::Exhausted`] once every numbered suffix is taken.
pub fn unique_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    let base = Path::new(filename);
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = base.extension().and_then(|s| s.to_str());

    let occupied: HashSet<String> = std::fs::read_dir(dir)
        .map_err(PathError::Io)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();

    let with_ext = |name: String| match ext {
        Some(ext) => format!("{name}.{ext}"),
        None => name,
    };

    let first = with_ext(stem.to_string());
    if !occupied.contains(&first) {
        return Ok(dir.join(first));
    }

    for i in 2..=MAX_SUFFIX {
        let candidate = with_ext(format!("{stem}_{i}"));
        if !occupied.contains(&candidate) {
            return Ok(dir.join(candidate));
        }
    }

    Err(PathError::Exhausted(filename.to_string()).into())
}

/// Create a uniquely named directory under `root` and return its path.
///
/// Uses the same numbering scheme as [`unique_path`].
pub fn make_log_dir(root: &Path, dirname: &str) -> Result<PathBuf> {
    let path = unique_path(root, dirname)?;
    std::fs::create_dir(&path).map_err(PathError::Io)?;
    tracing::debug!(path = %path.display(), "log directory created");
    Ok(path)
}
