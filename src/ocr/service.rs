//! OCR engine configuration and construction

use std::sync::Arc;

use serde::Deserialize;

use super::provider::{OcrEngine, OllamaEngine, TesseractEngine};
use super::types::OcrProvider;

/// OCR engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Engine used for the fallback batch
    pub provider: OcrProvider,
    /// Path to tesseract executable (default: "tesseract" - uses PATH)
    pub tesseract_path: String,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: OcrProvider::Tesseract,
            tesseract_path: "tesseract".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
        }
    }
}

/// Build the configured engine
pub fn build_engine(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    match config.provider {
        OcrProvider::Tesseract => Arc::new(TesseractEngine::new(&config.tesseract_path)),
        OcrProvider::Ollama => Arc::new(OllamaEngine::new(&config.ollama_url, &config.ollama_model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_follows_provider() {
        let mut config = OcrConfig::default();
        assert_eq!(build_engine(&config).provider_type(), OcrProvider::Tesseract);

        config.provider = OcrProvider::Ollama;
        assert_eq!(build_engine(&config).provider_type(), OcrProvider::Ollama);
    }
}
