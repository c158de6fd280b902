//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use docscan_core::models::config::ScanConfig;
use docscan_core::models::document::{Document, DocumentFormat, ProcessingOptions};
use docscan_core::models::record::DocumentType;
use docscan_core::scanner::{create_scanner, DocumentScanner};

use crate::providers::{HttpExtractionProvider, HttpOcrProvider};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docscan")
        .join("config.json")
}

/// Config file the `config` subcommand reads and writes.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration from an explicit path, the default path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = config_path {
        return Ok(ScanConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(ScanConfig::from_file(&path)?)
    } else {
        Ok(ScanConfig::default())
    }
}

/// Build a scanner wired to the configured HTTP services.
pub fn build_scanner(
    document_type: DocumentType,
    config: &ScanConfig,
) -> anyhow::Result<Box<dyn DocumentScanner>> {
    let ocr = Arc::new(HttpOcrProvider::new(&config.services)?);
    let extraction = Arc::new(HttpExtractionProvider::new(&config.services)?);
    Ok(create_scanner(document_type, ocr, extraction, config))
}

/// Read a file into a document, deriving the format from its extension.
pub fn load_document(path: &Path, options: &ProcessingOptions) -> anyhow::Result<Document> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let format = DocumentFormat::from_extension(&extension)
        .ok_or_else(|| anyhow::anyhow!("Unsupported file format: {}", extension))?;

    let content = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    Ok(Document::new(content, format)
        .with_name(name)
        .with_options(options.clone()))
}

/// Whether a path has an extension the scanners accept.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DocumentFormat::from_extension)
        .is_some()
}
