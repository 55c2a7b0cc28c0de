//! Default configuration constants for trsu.
//!
//! Shared between the config types, the CLI and the tests so the
//! values only live in one place.

/// Default token budget per transcript chunk.
///
/// Every chunk stays strictly below this count unless it consists of a
/// single line that is already larger on its own.
pub const TOKEN_LIMIT: usize = 15000;

/// Model whose vocabulary is used to count tokens.
pub const TOKENIZER_MODEL: &str = "gpt-3.5-turbo-16k";

/// Model the assistant runs on.
pub const ASSISTANT_MODEL: &str = "gpt-3.5-turbo";

/// Name given to the assistant created for each summary.
pub const ASSISTANT_NAME: &str = "transcript-summarizer";

/// Instructions given to the assistant created for each summary.
pub const ASSISTANT_INSTRUCTIONS: &str = "You are a person who summarizes provided transcripts";

/// Delay between two run status checks, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Maximum number of status checks before giving up. Zero means unbounded.
pub const MAX_POLLS: u32 = 0;

/// Base URL of the assistant API.
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound on a single API request, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment variables checked, in order, for the API credential.
pub const API_KEY_VARS: &[&str] = &["API_KEY", "OPENAI_API_KEY"];

/// Separator between the prompt and the transcript in an input file.
pub const DELIMITER: &str = "---";

/// Replaces the input file's extension to form the output file name.
pub const OUTPUT_SUFFIX: &str = "-trsu.txt";

/// Tag prefixed to every diagnostic line.
pub const LOG_TAG: &str = "trsu";
