//! Hybrid OCR command line
//!
//! Extracts page text from PDFs and images and prints it as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hybrid_ocr::ocr::{build_engine, OcrProvider};
use hybrid_ocr::pdf::PdfBackend;
use hybrid_ocr::{Config, PageRecord, Pipeline, Route};

#[derive(Debug, Parser)]
#[command(name = "hybrid-ocr", version, about = "Extract page text from PDFs and images")]
struct Cli {
    /// PDF, PNG or JPEG files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Files processed concurrently
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Override OCR_PROVIDER (tesseract, ollama)
    #[arg(long)]
    provider: Option<OcrProvider>,
}

#[derive(Serialize)]
struct FileReport {
    file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<PageRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let loaded = Config::from_env();
    let debug_mode = loaded.as_ref().map(|c| c.debug_mode).unwrap_or(true);

    // Initialize tracing (stderr; stdout carries the JSON)
    let default_filter = if debug_mode { "hybrid_ocr=debug" } else { "hybrid_ocr=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });
    if let Some(provider) = cli.provider {
        config.ocr.provider = provider;
    }

    tracing::info!("Starting hybrid-ocr v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("OCR provider: {:?}", config.ocr.provider);
    tracing::info!("Languages: {}", config.pipeline.supported_languages.join(","));

    let engine = build_engine(&config.ocr);
    if !engine.is_available().await {
        tracing::warn!("OCR provider {:?} is not available; OCR fallback will fail", config.ocr.provider);
    }

    let pipeline = Pipeline::new(config.pipeline, PdfBackend, engine)
        .context("Failed to build extraction pipeline")?;

    let reports: Vec<FileReport> = stream::iter(cli.files)
        .map(|file| {
            let pipeline = pipeline.clone();
            async move {
                match pipeline.process_file(&file).await {
                    Ok(extraction) => FileReport {
                        file,
                        route: Some(extraction.route),
                        pages: Some(extraction.pages),
                        error: None,
                    },
                    Err(e) => {
                        tracing::error!(file = %file.display(), "Extraction failed: {}", e);
                        FileReport {
                            file,
                            route: None,
                            pages: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
        })
        .buffered(cli.jobs.max(1))
        .collect()
        .await;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&reports)
    } else {
        serde_json::to_string(&reports)
    }
    .context("Failed to serialize results")?;
    println!("{}", output);

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, reports.len());
    }
    Ok(())
}
