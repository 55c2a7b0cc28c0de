//! Error types for trsu.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrsuError {
    // Input file errors
    #[error("Input file is empty: {path}")]
    EmptyInput { path: String },

    #[error("Prompt must be defined at the start of the file")]
    MissingPrompt,

    #[error("Transcript must be defined after prompt in the file")]
    MissingTranscript,

    // Tokenizer errors
    #[error("Tokenizer error: {message}")]
    Tokenizer { message: String },

    // Configuration errors
    #[error("No API key found (set one of: {vars})")]
    MissingApiKey { vars: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Assistant API errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Assistant API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed assistant API response: {0}")]
    Json(#[from] serde_json::Error),

    // Run lifecycle errors
    #[error("Run {run_id} failed: {message}")]
    RunFailed { run_id: String, message: String },

    #[error("Run {run_id} was cancelled")]
    RunCancelled { run_id: String },

    #[error("Run {run_id} expired before completing")]
    RunExpired { run_id: String },

    #[error("Run {run_id} ended incomplete: {reason}")]
    RunIncomplete { run_id: String, reason: String },

    #[error("Run {run_id} requires an action this client cannot perform")]
    RunRequiresAction { run_id: String },

    #[error("Run {run_id} did not complete after {polls} status checks")]
    PollTimeout { run_id: String, polls: u32 },

    #[error("Waiting for run {run_id} was cancelled")]
    Cancelled { run_id: String },

    #[error("Interrupted while {stage}")]
    Interrupted { stage: &'static str },

    #[error("Assistant reply is empty: {message}")]
    EmptyReply { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TrsuError>;

impl TrsuError {
    /// True for errors raised while reading the input file, before any
    /// remote call was made.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TrsuError::EmptyInput { .. } | TrsuError::MissingPrompt | TrsuError::MissingTranscript
        )
    }
}
