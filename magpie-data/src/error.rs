//! Error types for magpie-data organized by subsystem.

use thiserror::Error;

/// Data-utility error variants organized by subsystem.
#[derive(Debug, Error)]
pub enum Error {
    /// Vocabulary construction or lookup-context error
    #[error(transparent)]
    Vocab(#[from] VocabError),

    /// Tensor bundle writer/reader error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unique-path helper error
    #[error(transparent)]
    Path(#[from] PathError),

    /// Snapshot dump/load error
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Vocabulary errors (construction and process-wide registration).
#[derive(Debug, Error)]
pub enum VocabError {
    /// Configured CTC blank id does not equal the vocabulary size
    #[error("CTC blank id mismatch: configured {got}, vocabulary size is {expected}")]
    BlankIdMismatch { expected: i64, got: i64 },

    /// The process-wide vocabulary was used before `initialize`
    #[error("vocabulary not initialized: call vocab::initialize first")]
    Uninitialized,
}

/// Tensor bundle errors (writing and reading `.mag` files).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file already exists at the target path
    #[error("bundle file already exists: {0}")]
    AlreadyExists(String),

    /// Write call received an empty batch list
    #[error("empty batch list for dataset {0:?}")]
    EmptyBatch(String),

    /// Batches in one write call differ in rank
    #[error("inconsistent rank in dataset {key:?}: expected {expected}, got {got}")]
    RankMismatch {
        key: String,
        expected: usize,
        got: usize,
    },

    /// Concatenation axis is outside the batch rank
    #[error("concat axis {axis} out of bounds for rank {rank}")]
    AxisOutOfBounds { axis: usize, rank: usize },

    /// A dataset with this name was already written to the bundle
    #[error("dataset already written: {0}")]
    DuplicateDataset(String),

    /// The writer was used after `close`
    #[error("bundle already closed: {0}")]
    Closed(String),

    /// File does not start/end with the bundle magic
    #[error("not a bundle file: {0}")]
    BadMagic(String),

    /// Bundle format version not understood by this build
    #[error("unsupported bundle version: {0}")]
    UnsupportedVersion(u32),

    /// No dataset with the requested name in the manifest
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// Requested element type does not match the stored dtype
    #[error("dtype mismatch for dataset {name:?}: stored {stored}, requested {requested}")]
    DtypeMismatch {
        name: String,
        stored: &'static str,
        requested: &'static str,
    },

    /// Data block shorter than its manifest record claims
    #[error("truncated data for dataset {0:?}")]
    TruncatedData(String),

    /// Manifest serialization/deserialization error
    #[error("bundle manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// IO error on the backing file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Unique-path helper errors.
#[derive(Debug, Error)]
pub enum PathError {
    /// All numbered suffixes up to `_100` are occupied
    #[error("no free path for {0:?} after 100 attempts")]
    Exhausted(String),

    /// IO error while scanning or creating paths
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Snapshot dump/load errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Refusing to overwrite an existing snapshot file
    #[error("snapshot already exists: {0}")]
    AlreadyExists(String),

    /// Serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// IO error on the snapshot file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for magpie-data operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// std::io::Error → StoreError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Store(StoreError::Io(e))
    }
}

// serde_json::Error → StoreError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Store(StoreError::Manifest(e))
    }
}
