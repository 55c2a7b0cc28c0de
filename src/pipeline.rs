//! Summary pipeline.
//!
//! load → split → converse → write

use crate::assistant::client::AssistantApi;
use crate::assistant::conversation::{Conversation, Summary};
use crate::chunking::split_into_chunks;
use crate::document::{Document, load_document};
use crate::error::Result;
use crate::output::write_reply;
use crate::tokens::TokenCounter;
use std::path::{Path, PathBuf};

/// A loaded document and its transcript split into chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub document: Document,
    pub chunks: Vec<String>,
}

/// Result of summarising one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: PathBuf,
    pub summary: Summary,
    pub chunks: usize,
}

/// Load `path` and split its transcript. Makes no remote calls.
pub async fn prepare<C>(path: &Path, token_limit: usize, counter: &C) -> Result<Prepared>
where
    C: TokenCounter + ?Sized,
{
    let document = load_document(path).await?;
    let chunks = split_into_chunks(&document.transcript, token_limit, counter);
    tracing::info!(
        path = %path.display(),
        chunks = chunks.len(),
        token_limit,
        "transcript split"
    );
    Ok(Prepared { document, chunks })
}

/// Summarise the file at `path` and write the reply next to it.
///
/// Input errors surface before the assistant service is contacted.
pub async fn summarize_file<A, C>(
    path: &Path,
    token_limit: usize,
    counter: &C,
    conversation: &Conversation<A>,
) -> Result<Outcome>
where
    A: AssistantApi,
    C: TokenCounter + ?Sized,
{
    let prepared = prepare(path, token_limit, counter).await?;
    let summary = conversation
        .summarize(&prepared.document.prompt, &prepared.chunks)
        .await?;
    let output = write_reply(path, &summary.reply).await?;
    tracing::info!(output = %output.display(), "summary written");

    Ok(Outcome {
        output,
        summary,
        chunks: prepared.chunks.len(),
    })
}
