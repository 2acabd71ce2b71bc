//! Page usability classification

use serde::{Deserialize, Serialize};

use super::normalizer::TextNormalizer;

/// Outcome of classifying a page's native text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageUsability {
    /// Native text is kept as the page's result
    Usable,
    /// Page must be rasterized and sent to OCR
    NeedsOcr,
}

/// Classify normalized page text.
///
/// A page is usable when the text is non-empty OR has at least `min_words`
/// words. The word-count branch can only matter when `min_words` is zero, in
/// which case an empty page is still "usable"; the orchestrator partitions on
/// text presence and routes that page to OCR regardless.
pub fn classify(normalizer: &TextNormalizer, text: &str, min_words: usize) -> PageUsability {
    if !text.is_empty() || normalizer.word_count(text) >= min_words {
        PageUsability::Usable
    } else {
        PageUsability::NeedsOcr
    }
}
