//! Token counting against a model vocabulary.
//!
//! The vocabulary is loaded once per process through [`init`] and never
//! mutated afterwards. Every counter handed out borrows that single
//! instance.

use crate::error::{Result, TrsuError};
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

static VOCABULARY: OnceLock<(String, CoreBPE)> = OnceLock::new();

/// Something that can measure the token length of a text fragment.
///
/// Implementations must be deterministic: the same text always yields the
/// same count.
pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

/// Plain functions and closures count tokens too, which keeps tests free of
/// vocabulary files.
impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Token counter backed by the process-wide BPE vocabulary.
#[derive(Clone, Copy)]
pub struct BpeTokenCounter {
    model: &'static str,
    bpe: &'static CoreBPE,
}

impl BpeTokenCounter {
    /// Name of the model whose vocabulary is in use.
    pub fn model(&self) -> &str {
        self.model
    }
}

impl std::fmt::Debug for BpeTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenCounter")
            .field("model", &self.model)
            .finish()
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Load the vocabulary for `model` and return a counter bound to it.
///
/// The first successful call fixes the vocabulary for the rest of the
/// process. Later calls with the same model return the same vocabulary;
/// a different model is rejected.
pub fn init(model: &str) -> Result<BpeTokenCounter> {
    if VOCABULARY.get().is_none() {
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| TrsuError::Tokenizer {
            message: format!("no vocabulary for model '{model}': {e}"),
        })?;
        if VOCABULARY.set((model.to_string(), bpe)).is_err() {
            tracing::debug!("tokenizer vocabulary was initialised concurrently");
        }
    }

    let (loaded, bpe) = VOCABULARY.get().ok_or_else(|| TrsuError::Tokenizer {
        message: "vocabulary is not initialised".to_string(),
    })?;

    if loaded != model {
        return Err(TrsuError::Tokenizer {
            message: format!("vocabulary already initialised for '{loaded}', cannot switch to '{model}'"),
        });
    }

    tracing::debug!(model = %loaded, "tokenizer ready");
    Ok(BpeTokenCounter {
        model: loaded.as_str(),
        bpe,
    })
}

/// Counter for the vocabulary already loaded by [`init`], if any.
pub fn current() -> Option<BpeTokenCounter> {
    VOCABULARY.get().map(|(model, bpe)| BpeTokenCounter {
        model: model.as_str(),
        bpe,
    })
}
