//! trsu - transcript summarizer
//!
//! Splits a long transcript into token-bounded chunks, feeds them to a
//! remote assistant with a prompt, and writes the reply next to the input.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod assistant;
pub mod chunking;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod tokens;

// Composition root
#[cfg(feature = "cli")]
pub mod app;

// Core seams
pub use assistant::AssistantApi;
pub use tokens::TokenCounter;

// Pipeline
pub use assistant::{Conversation, PollPolicy, Summary};
pub use chunking::split_into_chunks;
pub use document::{Document, load_document, parse_document};
pub use output::{output_path, write_reply};
pub use pipeline::{Outcome, summarize_file};

// Error handling
pub use error::{Result, TrsuError};

// Config
pub use config::Config;

/// Version string shown by `--version`.
///
/// `"0.1.0+abc1234"` when built from a git checkout, `"0.1.0"` otherwise.
pub const VERSION: &str = env!("TRSU_VERSION");
