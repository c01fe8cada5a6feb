//! Incremental tensor writer for bundle files.
//!
//! A bundle holds named multi-dimensional datasets, one per `write` call.
//! Blocks stream to disk as they are written; the manifest goes into a
//! footer at `close`:
//!
//! ```text
//! b"MAGB"  u32-le version
//! data block per dataset (see element)
//! manifest JSON
//! u64-le manifest byte length
//! b"MAGB"
//! ```

use crate::element::{DType, Element};
use crate::error::{Result, StoreError};
use ndarray::{ArrayD, Axis, IxDyn, Slice};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Bundle file magic, leading and trailing.
pub const MAGIC: &[u8; 4] = b"MAGB";

/// Bundle format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Bundle file extension.
pub const BUNDLE_EXT: &str = "mag";

/// Byte length of the leading magic + version header.
pub(crate) const HEADER_LEN: u64 = 8;

/// Manifest record for one dataset in a bundle.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatasetRecord {
    /// Dataset name (the write key)
    pub name: String,
    /// Element type of the cells
    pub dtype: DType,
    /// Padded dataset shape
    pub shape: Vec<usize>,
    /// Absolute byte offset of the data block
    pub offset: u64,
    /// Byte length of the data block
    pub byte_len: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Manifest {
    pub(crate) datasets: Vec<DatasetRecord>,
}

/// Incremental writer producing one bundle file per (prefix, step) pair.
///
/// Each `write` call merges a list of same-rank batches into a single padded
/// dataset and appends it to the backing file. The writer owns its file
/// exclusively; dropping it closes the bundle.
pub struct Storer {
    path: PathBuf,
    file: Option<BufWriter<std::fs::File>>,
    offset: u64,
    records: Vec<DatasetRecord>,
}

impl Storer {
    /// Create a new bundle at `<dir>/<prefix>_<step>.mag`.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a file is already present
    /// at the target path, or an IO error if it cannot be created.
    pub fn create(dir: &Path, prefix: &str, step: u64) -> Result<Self> {
        let path = dir.join(format!("{prefix}_{step}.{BUNDLE_EXT}"));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    StoreError::AlreadyExists(path.display().to_string())
                }
                _ => StoreError::Io(e),
            })?;

        let mut file = BufWriter::new(file);
        file.write_all(MAGIC).map_err(StoreError::Io)?;
        file.write_all(&FORMAT_VERSION.to_le_bytes())
            .map_err(StoreError::Io)?;

        tracing::debug!(path = %path.display(), "bundle opened");

        Ok(Self {
            path,
            file: Some(file),
            offset: HEADER_LEN,
            records: Vec::new(),
        })
    }

    /// Path of the backing bundle file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `batches` along `axis` and append the result as dataset `key`.
    ///
    /// Dimensions along `axis` are summed; every other dimension is padded
    /// to the maximum size across the batch list, unoccupied cells holding
    /// the dtype sentinel (NaN, -2, or the empty string).
    ///
    /// # Errors
    ///
    /// Rejects empty batch lists, rank mismatches within the list, an axis
    /// outside the common rank, and keys already written to this bundle.
    pub fn write<T: Element>(&mut self, key: &str, batches: &[ArrayD<T>], axis: usize) -> Result<()> {
        if self.records.iter().any(|r| r.name == key) {
            return Err(StoreError::DuplicateDataset(key.to_string()).into());
        }

        let merged = merge_batches(key, batches, axis)?;

        let mut block = Vec::new();
        T::encode(&merged, &mut block);

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StoreError::Closed(self.path.display().to_string()))?;
        file.write_all(&block).map_err(StoreError::Io)?;

        tracing::debug!(
            key,
            dtype = %T::DTYPE,
            shape = ?merged.shape(),
            bytes = block.len(),
            "dataset written"
        );

        self.records.push(DatasetRecord {
            name: key.to_string(),
            dtype: T::DTYPE,
            shape: merged.shape().to_vec(),
            offset: self.offset,
            byte_len: block.len() as u64,
        });
        self.offset += block.len() as u64;

        Ok(())
    }

    /// Append a single array as dataset `key` without batch merging.
    pub fn write_single<T: Element>(
        &mut self,
        key: &str,
        array: &ArrayD<T>,
        axis: usize,
    ) -> Result<()> {
        self.write(key, std::slice::from_ref(array), axis)
    }

    /// Push buffered bytes to the OS without closing the bundle.
    pub fn flush(&mut self) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StoreError::Closed(self.path.display().to_string()))?;
        file.flush().map_err(StoreError::Io)?;
        Ok(())
    }

    /// Write the manifest footer and release the backing file.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        let manifest = serde_json::to_vec(&Manifest {
            datasets: std::mem::take(&mut self.records),
        })
        .map_err(StoreError::Manifest)?;

        file.write_all(&manifest).map_err(StoreError::Io)?;
        file.write_all(&(manifest.len() as u64).to_le_bytes())
            .map_err(StoreError::Io)?;
        file.write_all(MAGIC).map_err(StoreError::Io)?;
        file.flush().map_err(StoreError::Io)?;
        file.get_ref().sync_all().map_err(StoreError::Io)?;

        tracing::debug!(path = %self.path.display(), "bundle closed");

        Ok(())
    }
}

impl Drop for Storer {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                tracing::error!(path = %self.path.display(), error = %e, "bundle close failed");
            }
        }
    }
}

/// Merge same-rank batches into one padded array along `axis`.
fn merge_batches<T: Element>(key: &str, batches: &[ArrayD<T>], axis: usize) -> Result<ArrayD<T>> {
    let first = batches
        .first()
        .ok_or_else(|| StoreError::EmptyBatch(key.to_string()))?;
    let rank = first.ndim();

    if axis >= rank {
        return Err(StoreError::AxisOutOfBounds { axis, rank }.into());
    }

    for batch in batches {
        if batch.ndim() != rank {
            return Err(StoreError::RankMismatch {
                key: key.to_string(),
                expected: rank,
                got: batch.ndim(),
            }
            .into());
        }
    }

    let mut shape: Vec<usize> = (0..rank)
        .map(|d| batches.iter().map(|b| b.shape()[d]).max().unwrap_or(0))
        .collect();
    shape[axis] = batches.iter().map(|b| b.shape()[axis]).sum();

    let mut merged = ArrayD::from_elem(IxDyn(&shape), T::fill());

    let mut row = 0;
    for batch in batches {
        let mut slot = merged.view_mut();
        for (d, &len) in batch.shape().iter().enumerate() {
            let start = if d == axis { row } else { 0 };
            slot.slice_axis_inplace(Axis(d), Slice::from(start..start + len));
        }
        slot.assign(batch);
        row += batch.shape()[axis];
    }

    Ok(merged)
}
