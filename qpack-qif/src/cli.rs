//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Replay QIF interop captures through the qpack codec.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(long, short = 'c', global = true, default_value = "qpack-qif.toml")]
    pub config: PathBuf,

    /// Log level (overrides config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Reject Huffman literals whose padding is not a short run of 1 bits
    #[arg(long, global = true)]
    pub strict_huffman_padding: bool,

    /// Log undecodable header blocks and continue with the next stream
    #[arg(long, global = true)]
    pub keep_going: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Decode an encoded capture into QIF text
    Decode {
        /// Encoded capture (stream id, length, payload records)
        input: PathBuf,
        /// QIF text output
        output: PathBuf,
    },
    /// Encode QIF text into a capture
    Encode {
        /// QIF text input
        input: PathBuf,
        /// Encoded capture output
        output: PathBuf,
    },
}
