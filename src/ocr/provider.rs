//! OCR Engines
//!
//! Defines the batch engine trait and implementations for different OCR
//! backends. An engine receives every image of a document in one call.

use async_trait::async_trait;
use tokio::process::Command;

use crate::document::PageImage;

use super::types::{OcrError, OcrPrediction, OcrProvider};

/// Batch OCR engine
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the engine can run
    async fn is_available(&self) -> bool;

    /// Recognize a batch of images.
    ///
    /// Returns exactly one prediction per input image, in input order.
    async fn recognize_batch(
        &self,
        images: &[PageImage],
        languages: &[String],
    ) -> Result<Vec<OcrPrediction>, OcrError>;
}

/// Map ISO 639-1 codes to Tesseract traineddata names; other codes pass
/// through unchanged.
pub fn tesseract_language(code: &str) -> &str {
    match code {
        "vi" => "vie",
        "en" => "eng",
        "fr" => "fra",
        "de" => "deu",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        "ru" => "rus",
        "ja" => "jpn",
        "ko" => "kor",
        "zh" => "chi_sim",
        other => other,
    }
}

/// Validate a language code to prevent argument injection
pub fn validate_language(lang: &str) -> Result<(), OcrError> {
    // Language codes are alphanumeric with optional underscore (e.g. "eng", "chi_sim")
    if lang.is_empty() || lang.len() > 20 {
        return Err(OcrError::InvalidLanguage(format!(
            "invalid language code length: {:?}",
            lang
        )));
    }
    for c in lang.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(OcrError::InvalidLanguage(format!(
                "invalid character in language code {:?}: {}",
                lang, c
            )));
        }
    }
    Ok(())
}

/// Tesseract OCR engine (shells out to the `tesseract` CLI)
pub struct TesseractEngine {
    /// Path to the tesseract executable
    binary: String,
}

impl TesseractEngine {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    /// `-l` argument: mapped codes joined with `+`
    fn language_arg(languages: &[String]) -> Result<String, OcrError> {
        let mut codes = Vec::with_capacity(languages.len());
        for lang in languages {
            let code = tesseract_language(lang.trim());
            validate_language(code)?;
            codes.push(code);
        }
        if codes.is_empty() {
            codes.push("eng");
        }
        Ok(codes.join("+"))
    }

    async fn recognize_one(&self, image: &PageImage, lang: &str) -> Result<OcrPrediction, OcrError> {
        // Removed when dropped, on every exit path
        let input = tempfile::Builder::new()
            .prefix("ocr_page_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create temp file: {}", e)))?;

        tokio::fs::write(input.path(), &image.png)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output()
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed on page {}: {}",
                image.page_no, stderr
            )));
        }

        Ok(OcrPrediction::from_text(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        let result = Command::new(&self.binary)
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;

        matches!(result, Ok(status) if status.success())
    }

    async fn recognize_batch(
        &self,
        images: &[PageImage],
        languages: &[String],
    ) -> Result<Vec<OcrPrediction>, OcrError> {
        let lang = Self::language_arg(languages)?;
        tracing::debug!(images = images.len(), lang = %lang, "Running tesseract batch");

        let mut predictions = Vec::with_capacity(images.len());
        for image in images {
            predictions.push(self.recognize_one(image, &lang).await?);
        }
        Ok(predictions)
    }
}

/// Ollama vision model engine
pub struct OllamaEngine {
    client: reqwest::Client,
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
}

impl OllamaEngine {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn prompt(languages: &[String]) -> String {
        let lang_hint = if languages.is_empty() {
            String::new()
        } else {
            format!(" The text is in {}.", languages.join(", "))
        };

        format!(
            "Extract all text from this image exactly as written, line by line.{} Return only the extracted text, nothing else.",
            lang_hint
        )
    }

    async fn recognize_one(&self, image: &PageImage, prompt: &str) -> Result<OcrPrediction, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image.png);

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {} for page {}: {}",
                status, image.page_no, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = result["response"].as_str().unwrap_or("");
        Ok(OcrPrediction::from_text(text))
    }
}

#[async_trait]
impl OcrEngine for OllamaEngine {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Ollama
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize_batch(
        &self,
        images: &[PageImage],
        languages: &[String],
    ) -> Result<Vec<OcrPrediction>, OcrError> {
        let prompt = Self::prompt(languages);
        tracing::debug!(images = images.len(), model = %self.model, "Running Ollama batch");

        let mut predictions = Vec::with_capacity(images.len());
        for image in images {
            predictions.push(self.recognize_one(image, &prompt).await?);
        }
        Ok(predictions)
    }
}
