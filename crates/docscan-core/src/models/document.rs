//! Input documents handed to a scanner.

use serde::{Deserialize, Serialize};

/// Representation of the document bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Photographed or scanned image (JPEG, PNG, WebP, ...).
    Image,
    /// PDF document.
    Pdf,
}

impl DocumentFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "png" | "jpg" | "jpeg" | "webp" | "gif" | "tif" | "tiff" | "bmp" | "avif"
            | "heic" => Some(DocumentFormat::Image),
            _ => None,
        }
    }

    /// Check whether a MIME type belongs to this format.
    pub fn accepts_mime(&self, mime_type: &str) -> bool {
        match self {
            DocumentFormat::Pdf => mime_type == "application/pdf",
            DocumentFormat::Image => mime_type.starts_with("image/"),
        }
    }

    /// Format name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Image => "image",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to the OCR collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Zero-based page indexes to recognize (all pages when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<u32>>,

    /// Language hints such as `en` or `pol`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub language_hints: Vec<String>,

    /// Ask the collaborator to return embedded images.
    pub include_image_data: bool,

    /// Maximum number of embedded images to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_limit: Option<u32>,
}

/// A document to scan. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    content: Vec<u8>,
    format: DocumentFormat,
    mime_type: Option<String>,
    name: Option<String>,
    options: ProcessingOptions,
}

impl Document {
    /// Create a document from raw bytes.
    pub fn new(content: impl Into<Vec<u8>>, format: DocumentFormat) -> Self {
        Self {
            content: content.into(),
            format,
            mime_type: None,
            name: None,
            options: ProcessingOptions::default(),
        }
    }

    /// Shorthand for an image document.
    pub fn image(content: impl Into<Vec<u8>>) -> Self {
        Self::new(content, DocumentFormat::Image)
    }

    /// Shorthand for a PDF document.
    pub fn pdf(content: impl Into<Vec<u8>>) -> Self {
        Self::new(content, DocumentFormat::Pdf)
    }

    /// Set the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set processing options.
    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Name for log lines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Declared MIME type, or a sensible default for the format.
    pub fn effective_mime_type(&self) -> String {
        if let Some(mime) = &self.mime_type {
            return mime.clone();
        }
        if let Some(kind) = infer::get(&self.content) {
            return kind.mime_type().to_string();
        }
        match self.format {
            DocumentFormat::Pdf => "application/pdf".to_string(),
            DocumentFormat::Image => "image/jpeg".to_string(),
        }
    }
}
