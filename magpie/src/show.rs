//! Show subcommand - inspect the datasets of a bundle file.

use eyre::{Result, WrapErr};
use magpie_data::bundle::Bundle;
use magpie_data::element::DType;
use std::path::{Path, PathBuf};

/// CLI arguments for bundle inspection.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to a bundle (.mag) file
    pub path: PathBuf,

    /// Print the decoded array for this dataset instead of the listing
    #[arg(long)]
    pub data: Option<String>,
}

/// Resolved configuration for bundle inspection.
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub data: Option<String>,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            path: args.path,
            data: args.data,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(path = %config.path.display(), "opening bundle");

    let bundle = Bundle::open(&config.path)
        .wrap_err_with(|| format!("failed to open bundle: {}", config.path.display()))?;

    match config.data {
        Some(name) => print_dataset(&bundle, &name, &config.path),
        None => {
            print_listing(&bundle);
            Ok(())
        }
    }
}

/// Print one manifest line per dataset.
fn print_listing(bundle: &Bundle) {
    for record in bundle.datasets() {
        println!(
            "{}  dtype={}  shape={:?}  bytes={}",
            record.name, record.dtype, record.shape, record.byte_len
        );
    }
}

/// Decode and print a single dataset.
fn print_dataset(bundle: &Bundle, name: &str, path: &Path) -> Result<()> {
    let record = bundle
        .record(name)
        .ok_or_else(|| eyre::eyre!("no dataset {name:?} in {}", path.display()))?;

    match record.dtype {
        DType::F32 => println!("{}", bundle.dataset::<f32>(name)?),
        DType::F64 => println!("{}", bundle.dataset::<f64>(name)?),
        DType::I32 => println!("{}", bundle.dataset::<i32>(name)?),
        DType::I64 => println!("{}", bundle.dataset::<i64>(name)?),
        DType::Str => println!("{:?}", bundle.dataset::<String>(name)?),
    }

    Ok(())
}
