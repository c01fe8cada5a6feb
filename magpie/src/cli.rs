//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "mag")]
#[command(about = "Inspect tensor bundles and decode token-id sequences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v: debug, -vv: trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log level for the subscriber when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the datasets of a bundle file, or print one of them
    Show(crate::show::Args),

    /// Decode a token-id sequence against a vocabulary
    Decode(crate::decode::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Show(args) => crate::show::execute(args.try_into()?),
        Commands::Decode(args) => crate::decode::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_command() {
        let cli = Cli::parse_from(["mag", "show", "eval_100.mag"]);

        match &cli.command {
            Commands::Show(crate::show::Args { path, data: None })
                if path.to_str() == Some("eval_100.mag") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_show_with_dataset() {
        let cli = Cli::parse_from(["mag", "show", "eval_100.mag", "--data", "ids"]);

        match &cli.command {
            Commands::Show(crate::show::Args {
                path,
                data: Some(data),
            }) if path.to_str() == Some("eval_100.mag") && data == "ids" => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_decode_command() {
        let cli = Cli::parse_from(["mag", "decode", "3", "-1", "7", "--data-dir", "data"]);

        match &cli.command {
            Commands::Decode(crate::decode::Args {
                ids,
                data_dir,
                blank_id: None,
                label,
                separator: None,
            }) if ids == &[3, -1, 7] && data_dir.to_str() == Some("data") && label == "pred" => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_decode_with_options() {
        let cli = Cli::parse_from([
            "mag",
            "decode",
            "0",
            "--data-dir",
            "data",
            "--blank-id",
            "358",
            "--label",
            "gold",
            "--separator",
            " ",
        ]);

        match &cli.command {
            Commands::Decode(crate::decode::Args {
                blank_id: Some(358),
                label,
                separator: Some(sep),
                ..
            }) if label == "gold" && sep == " " => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn verbosity_maps_to_log_level() {
        let quiet = Cli::parse_from(["mag", "show", "x.mag"]);
        assert_eq!(quiet.default_log_level(), "info");

        let debug = Cli::parse_from(["mag", "-v", "show", "x.mag"]);
        assert_eq!(debug.default_log_level(), "debug");

        let trace = Cli::parse_from(["mag", "-vv", "show", "x.mag"]);
        assert_eq!(trace.default_log_level(), "trace");
    }
}
