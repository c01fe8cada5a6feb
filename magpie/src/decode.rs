//! Decode subcommand - map a token-id sequence to words.

use eyre::{Result, WrapErr};
use magpie_data::vocab::{self, DecodeConfig};
use ndarray::Array2;
use std::path::PathBuf;

/// CLI arguments for token-id decoding.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Token ids to decode, in sequence order
    #[arg(required = true, allow_negative_numbers = true)]
    pub ids: Vec<i64>,

    /// Data directory holding id2word.json
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Expected CTC blank id (must equal the vocabulary size)
    #[arg(long)]
    pub blank_id: Option<i64>,

    /// Label prefixed to the decoded line
    #[arg(long, default_value = "pred")]
    pub label: String,

    /// Separator between words (default: none)
    #[arg(long)]
    pub separator: Option<String>,
}

/// Resolved configuration for token-id decoding.
#[derive(Debug)]
pub struct Config {
    pub ids: Vec<i64>,
    pub data_dir: PathBuf,
    pub decode: DecodeConfig,
    pub label: String,
    pub separator: Option<String>,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            ids: args.ids,
            data_dir: args.data_dir,
            decode: DecodeConfig {
                ctc_blank_id: args.blank_id,
            },
            label: args.label,
            separator: args.separator,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(dir = %config.data_dir.display(), "loading vocabulary");

    let vocabulary = vocab::initialize(&config.data_dir, &config.decode)
        .wrap_err_with(|| format!("failed to load vocabulary: {}", config.data_dir.display()))?;

    tracing::debug!(vocab_size = vocabulary.vocab_size(), "vocabulary ready");

    let ids = Array2::from_shape_vec((1, config.ids.len()), config.ids)?;
    let lines = vocabulary.seq2str(&ids, &config.label, config.separator.as_deref());

    for line in lines {
        println!("{line}");
    }

    Ok(())
}
