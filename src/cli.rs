//! Command-line interface for trsu
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Summarize long transcripts with an AI assistant
#[derive(Parser, Debug)]
#[command(
    name = "trsu",
    version = crate::VERSION,
    about = "Summarize long transcripts with an AI assistant",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file: a prompt, a `---` line, then the transcript
    #[arg(value_name = "FILE", required = true)]
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Assistant model (default: gpt-3.5-turbo)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Token budget per transcript chunk (default: 15000)
    #[arg(long, global = true, value_name = "TOKENS", value_parser = parse_token_limit)]
    pub token_limit: Option<usize>,

    /// Delay between run status checks. Examples: 500ms, 2s
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Give up waiting for the run after this long. Examples: 90s, 5m
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

/// Parse a duration string.
///
/// Supports any duration format accepted by `humantime`, plus bare numbers
/// as seconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_token_limit(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("token limit must be positive".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a file into chunks and print their sizes (no API calls)
    Chunks {
        /// Input file: a prompt, a `---` line, then the transcript
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
