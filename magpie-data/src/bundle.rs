//! Reader for bundle files produced by the storer.

use crate::element::Element;
use crate::error::{Result, StoreError};
use crate::store::{DatasetRecord, FORMAT_VERSION, HEADER_LEN, MAGIC, Manifest};
use std::path::Path;

/// An opened bundle file with its manifest parsed.
///
/// Bundles written during a training run are small enough to hold in memory,
/// so the reader keeps the whole file and decodes datasets on demand.
pub struct Bundle {
    data: Vec<u8>,
    records: Vec<DatasetRecord>,
}

impl Bundle {
    /// Open a bundle file and validate its framing.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::BadMagic`] if either magic is missing,
    /// [`StoreError::UnsupportedVersion`] for unknown format versions, or a
    /// manifest error if the footer does not parse.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(StoreError::Io)?;
        let display = || path.display().to_string();

        // Leading magic + version, trailing magic + manifest length.
        let min_len = HEADER_LEN as usize + 8 + MAGIC.len();
        if data.len() < min_len || &data[..4] != MAGIC || !data.ends_with(MAGIC) {
            return Err(StoreError::BadMagic(display()).into());
        }

        let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(version).into());
        }

        let len_end = data.len() - MAGIC.len();
        let manifest_len =
            u64::from_le_bytes(data[len_end - 8..len_end].try_into().unwrap()) as usize;

        let manifest_end = len_end - 8;
        let manifest_start = manifest_end
            .checked_sub(manifest_len)
            .filter(|&start| start >= HEADER_LEN as usize)
            .ok_or_else(|| StoreError::BadMagic(display()))?;

        let manifest: Manifest = serde_json::from_slice(&data[manifest_start..manifest_end])
            .map_err(StoreError::Manifest)?;

        Ok(Self {
            data,
            records: manifest.datasets,
        })
    }

    /// Manifest records in write order.
    pub fn datasets(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Manifest record for a named dataset.
    pub fn record(&self, name: &str) -> Option<&DatasetRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Decode a named dataset into an array of `T`.
    ///
    /// # Errors
    ///
    /// Fails if the dataset is absent, stored under a different dtype, or
    /// its data block does not decode to the recorded shape.
    pub fn dataset<T: Element>(&self, name: &str) -> Result<ndarray::ArrayD<T>> {
        let record = self
            .record(name)
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))?;

        if record.dtype != T::DTYPE {
            return Err(StoreError::DtypeMismatch {
                name: name.to_string(),
                stored: record.dtype.name(),
                requested: T::DTYPE.name(),
            }
            .into());
        }

        let start = record.offset as usize;
        let end = start + record.byte_len as usize;
        let block = self
            .data
            .get(start..end)
            .ok_or_else(|| StoreError::TruncatedData(name.to_string()))?;

        T::decode(block, &record.shape)
            .ok_or_else(|| StoreError::TruncatedData(name.to_string()).into())
    }
}
