//! Configuration management
//!
//! Loaded once at process start (after `dotenvy`) and handed to the pipeline
//! as an immutable value.

use std::env;

use regex::Regex;
use serde::Deserialize;

use crate::document::RasterZoom;
use crate::ocr::{OcrConfig, OcrProvider};

pub const DEFAULT_WATERMARK_PATTERNS: &str = "watermark|confidential|draft|copy|www.LuatVietnam.vn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub ocr: OcrConfig,
    /// Verbose logging (`DEBUG_MODE=on|yes|enabled`)
    pub debug_mode: bool,
}

/// Values the extraction pipeline consumes
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Language hints passed to the OCR engine
    pub supported_languages: Vec<String>,
    /// Word threshold used by the page usability classifier
    pub min_words_per_page: usize,
    /// Case-insensitive alternation stripped from native text
    pub watermark_patterns: String,
    /// Rasterization scale for OCR fallback
    pub raster_zoom: RasterZoom,
    /// Largest accepted input, in bytes
    pub max_file_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            supported_languages: vec!["vi".to_string()],
            min_words_per_page: 100,
            watermark_patterns: DEFAULT_WATERMARK_PATTERNS.to_string(),
            raster_zoom: RasterZoom::default(),
            max_file_size: 52_428_800,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pipeline: PipelineConfig::default(),
            ocr: OcrConfig::default(),
            debug_mode: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let supported_languages = match lookup("SUPPORTED_LANGUAGES") {
            Some(raw) => parse_languages(&raw),
            None => defaults.pipeline.supported_languages,
        };

        let min_words_per_page = parse_or("MINIMUM_WORDS_PER_PAGE", &lookup, defaults.pipeline.min_words_per_page)?;
        let max_file_size = parse_or("MAX_FILE_SIZE", &lookup, defaults.pipeline.max_file_size)?;
        let zoom_x = parse_or("RASTER_ZOOM_X", &lookup, defaults.pipeline.raster_zoom.x)?;
        let zoom_y = parse_or("RASTER_ZOOM_Y", &lookup, defaults.pipeline.raster_zoom.y)?;
        for (var, zoom) in [("RASTER_ZOOM_X", zoom_x), ("RASTER_ZOOM_Y", zoom_y)] {
            if !(zoom.is_finite() && zoom > 0.0) {
                return Err(ConfigError::Invalid {
                    var,
                    value: zoom.to_string(),
                });
            }
        }

        let provider = match lookup("OCR_PROVIDER") {
            Some(raw) => raw.parse::<OcrProvider>().map_err(|_| ConfigError::Invalid {
                var: "OCR_PROVIDER",
                value: raw,
            })?,
            None => defaults.ocr.provider,
        };

        Ok(Config {
            pipeline: PipelineConfig {
                supported_languages,
                min_words_per_page,
                watermark_patterns: lookup("WATERMARK_PATTERNS")
                    .unwrap_or(defaults.pipeline.watermark_patterns),
                raster_zoom: RasterZoom { x: zoom_x, y: zoom_y },
                max_file_size,
            },
            ocr: OcrConfig {
                provider,
                tesseract_path: lookup("TESSERACT_PATH").unwrap_or(defaults.ocr.tesseract_path),
                ollama_url: lookup("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
            },
            debug_mode: lookup("DEBUG_MODE")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "on" | "yes" | "enabled"))
                .unwrap_or(defaults.debug_mode),
        })
    }
}

/// Split a `vi,en;fr` style list on `,` and `;`
fn parse_languages(raw: &str) -> Vec<String> {
    let separator = Regex::new("[,;]").expect("valid regex");
    separator
        .split(raw)
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T, F>(var: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}
