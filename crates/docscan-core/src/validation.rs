//! Structural checks applied before any network call.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ValidationError;
use crate::models::config::ValidationConfig;
use crate::models::document::{Document, DocumentFormat, ProcessingOptions};

/// Validator for incoming documents.
#[derive(Debug, Clone)]
pub struct InputValidator {
    config: ValidationConfig,
}

impl InputValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check a document and hand it back unchanged, or report the first
    /// violated constraint.
    pub fn validate<'a>(&self, document: &'a Document) -> Result<&'a Document, ValidationError> {
        let content = document.content();
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        if content.len() > self.config.max_content_bytes {
            return Err(ValidationError::TooLarge {
                size: content.len(),
                limit: self.config.max_content_bytes,
            });
        }

        if let Some(declared) = document.mime_type() {
            self.check_declared_mime(declared, document.format())?;
        }

        check_content_kind(content, document.format())?;
        check_options(document.options())?;

        debug!(
            "Validated {} ({} bytes, {})",
            document.display_name(),
            content.len(),
            document.format()
        );

        Ok(document)
    }

    fn check_declared_mime(&self, declared: &str, format: DocumentFormat) -> Result<(), ValidationError> {
        let mime = normalize_mime(declared);

        if !self.config.accepted_mime_types.iter().any(|m| m.eq_ignore_ascii_case(&mime)) {
            return Err(ValidationError::UnsupportedMimeType(declared.to_string()));
        }

        if !format.accepts_mime(&mime) {
            return Err(ValidationError::FormatMismatch {
                mime_type: declared.to_string(),
                format: format.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Strip parameters (`; charset=...`) and lowercase.
fn normalize_mime(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_lowercase()
}

/// Compare the magic bytes against the format tag. Unknown content passes;
/// the OCR service has the final word on it.
fn check_content_kind(content: &[u8], format: DocumentFormat) -> Result<(), ValidationError> {
    let Some(kind) = infer::get(content) else {
        return Ok(());
    };

    let detected = kind.mime_type();
    let matches = match format {
        DocumentFormat::Pdf => detected == "application/pdf",
        DocumentFormat::Image => kind.matcher_type() == infer::MatcherType::Image,
    };

    if matches {
        Ok(())
    } else {
        Err(ValidationError::ContentMismatch {
            detected: detected.to_string(),
            format: format.to_string(),
        })
    }
}

fn check_options(options: &ProcessingOptions) -> Result<(), ValidationError> {
    if let Some(pages) = &options.pages {
        if pages.is_empty() {
            return Err(ValidationError::InvalidOptions(
                "page selection is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = pages.iter().find(|p| !seen.insert(**p)) {
            return Err(ValidationError::InvalidOptions(format!(
                "page {} selected twice",
                dup
            )));
        }
    }

    if options.image_limit == Some(0) {
        return Err(ValidationError::InvalidOptions(
            "image limit must be positive".to_string(),
        ));
    }

    for hint in &options.language_hints {
        let hint = hint.trim();
        if hint.is_empty() || !hint.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return Err(ValidationError::InvalidOptions(format!(
                "invalid language hint '{}'",
                hint
            )));
        }
    }

    Ok(())
}
