//! Text normalization and page usability heuristics

mod classifier;
mod normalizer;

pub use classifier::{classify, PageUsability};
pub use normalizer::TextNormalizer;
