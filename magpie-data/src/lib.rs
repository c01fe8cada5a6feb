//! magpie-data: data utilities for training runs.
//!
//! Three independent pieces sit behind this crate:
//!
//! - [`vocab`]: maps numeric token ids back to vocabulary words for decoding
//!   model output, with injected CTC-blank and catch-all entries
//! - [`store`] / [`bundle`]: an incremental writer that merges ragged
//!   batches of tensors into padded on-disk datasets, and its reader
//! - [`snapshot`] / [`paths`]: write-once JSON persistence and unique
//!   log-path helpers
//!
//! # Quick Start
//!
//! ```no_run
//! use magpie_data::store::Storer;
//! use magpie_data::vocab::{self, DecodeConfig};
//! use ndarray::array;
//! use std::path::Path;
//!
//! # fn main() -> magpie_data::Result<()> {
//! // Decode model output to labelled strings.
//! let vocab = vocab::initialize(Path::new("data"), &DecodeConfig::default())?;
//! let lines = vocab.seq2str(&array![[0, 1, 2]], "pred", None);
//!
//! // Persist a ragged pair of batches as one padded dataset.
//! let mut storer = Storer::create(Path::new("out"), "eval", 100)?;
//! let batches = [array![[1i64, 2, 3]].into_dyn(), array![[4i64]].into_dyn()];
//! storer.write("ids", &batches, 0)?;
//! storer.close()?;
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod element;
pub mod error;
pub mod paths;
pub mod snapshot;
pub mod store;
pub mod vocab;

pub use error::{Error, Result};
