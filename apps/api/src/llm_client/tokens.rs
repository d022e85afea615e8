//! Approximate token counting for prompts sent to the generation backend.
//!
//! The count is only a placeholder until the backend reports real usage.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Character-count heuristic: roughly four characters per token.
pub fn heuristic_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// BPE-backed estimator resolved once for a model family.
///
/// The encoding table is immutable, so clones share it freely.
#[derive(Clone)]
pub struct TokenEstimator {
    bpe: Option<Arc<CoreBPE>>,
}

impl TokenEstimator {
    /// Resolves the encoding for `model_hint`, falling back to `cl100k_base`
    /// for unknown models and to the character heuristic if neither loads.
    pub fn for_model(model_hint: &str) -> Self {
        let bpe = tiktoken_rs::get_bpe_from_model(model_hint)
            .or_else(|_| tiktoken_rs::cl100k_base());

        match bpe {
            Ok(bpe) => Self {
                bpe: Some(Arc::new(bpe)),
            },
            Err(e) => {
                warn!("No BPE table for '{model_hint}', using character heuristic: {e}");
                Self::heuristic()
            }
        }
    }

    /// An estimator that never loads a table.
    pub fn heuristic() -> Self {
        Self { bpe: None }
    }

    pub fn estimate(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => heuristic_tokens(text),
        }
    }
}
