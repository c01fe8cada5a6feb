//! magpie CLI library: bundle inspection and token-id decoding.

pub mod cli;
pub mod decode;
pub mod show;
