//! Text normalization
//!
//! Strips watermark boilerplate from extracted page text so it cannot pass
//! for real content, collapses whitespace, and counts words.

use regex::Regex;

/// Compiled watermark pattern plus the whitespace/word regexes
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    watermark: Regex,
    whitespace: Regex,
    word: Regex,
}

impl TextNormalizer {
    /// Compile a normalizer for a caller-supplied watermark alternation
    /// (e.g. `watermark|confidential|draft`). Matching is case-insensitive.
    pub fn new(watermark_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            watermark: Regex::new(&format!("(?i){}", watermark_pattern))?,
            whitespace: Regex::new(r"\s+")?,
            word: Regex::new(r"\b\w+\b")?,
        })
    }

    /// Remove watermark matches, collapse whitespace runs to one space, trim.
    ///
    /// Passes repeat until the text stops changing: removing a match or
    /// collapsing whitespace can splice together a new match.
    ///
    /// After the first pass the text holds only single inner spaces, so any
    /// later change removes a non-empty match and shortens it. That bounds the
    /// loop at `len + 1` passes, quadratic at worst for nested input such as
    /// `a^k b^k` with pattern `ab`.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.single_pass(raw);
        loop {
            let next = self.single_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn single_pass(&self, text: &str) -> String {
        let stripped = self.watermark.replace_all(text, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        collapsed.trim().to_string()
    }

    /// Number of `\w+` runs between word boundaries
    pub fn word_count(&self, text: &str) -> usize {
        self.word.find_iter(text).count()
    }
}
