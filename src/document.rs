//! Input file parsing: a prompt, the `---` delimiter, then the transcript.

use crate::defaults::DELIMITER;
use crate::error::{Result, TrsuError};
use std::path::Path;

/// Prompt and transcript read from one input file, both trimmed and
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub prompt: String,
    pub transcript: String,
}

/// Parse file contents into a [`Document`].
///
/// The text is cut at every delimiter; the first piece is the prompt and
/// the second the transcript. Anything after a second delimiter is ignored.
pub fn parse_document(contents: &str) -> Result<Document> {
    let mut parts = contents.split(DELIMITER);
    let prompt = parts.next().map(str::trim).unwrap_or_default();
    let transcript = parts.next().map(str::trim).unwrap_or_default();

    if prompt.is_empty() {
        return Err(TrsuError::MissingPrompt);
    }
    if transcript.is_empty() {
        return Err(TrsuError::MissingTranscript);
    }

    Ok(Document {
        prompt: prompt.to_string(),
        transcript: transcript.to_string(),
    })
}

/// Read and parse the input file at `path`.
pub async fn load_document(path: &Path) -> Result<Document> {
    let contents = tokio::fs::read_to_string(path).await?;
    if contents.is_empty() {
        return Err(TrsuError::EmptyInput {
            path: path.display().to_string(),
        });
    }
    tracing::debug!(path = %path.display(), bytes = contents.len(), "input file read");
    parse_document(&contents)
}
