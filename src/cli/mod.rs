//! Command-line interface.

mod convert;
mod run;

pub use convert::execute as convert;
pub use run::execute as run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Real-time sports odds arbitrage detection.
#[derive(Debug, Parser)]
#[command(name = "oddsmith", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the engine against newline-delimited JSON quotes on stdin,
    /// printing lifecycle transitions as JSON lines.
    Run {
        /// Path to the configuration file.
        #[arg(short, long, default_value = "oddsmith.toml")]
        config: PathBuf,
    },
    /// Convert a price between odds formats.
    Convert {
        /// The price to convert: "150", "-200", "2.50", or "3/2".
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Source format: american, decimal, or fractional.
        #[arg(long)]
        from: String,
        /// Target format: american, decimal, or fractional.
        #[arg(long)]
        to: String,
    },
}
