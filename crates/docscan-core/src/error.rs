//! Error types for the docscan-core library.
//!
//! Every pipeline stage returns its failure as a value. [`ScanError`] wraps the
//! stage failures with the prefix that identifies which stage gave up.

use thiserror::Error;

/// Error type for configuration and I/O around the pipeline.
#[derive(Error, Debug)]
pub enum DocscanError {
    /// A scan failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure of a single document scan, prefixed by the stage that failed.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The document was rejected before any collaborator was called.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The OCR collaborator failed.
    #[error("OCR processing failed: {0}")]
    Recognition(#[from] OcrError),

    /// The OCR collaborator succeeded but produced no page.
    #[error("OCR processing returned empty results")]
    EmptyRecognition,

    /// The extraction stage failed.
    #[error("Data extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl ScanError {
    /// Name of the stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            ScanError::Validation(_) => "validate",
            ScanError::Recognition(_) | ScanError::EmptyRecognition => "recognize",
            ScanError::Extraction(_) => "extract",
        }
    }
}

/// Structural preconditions checked before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The document has no bytes.
    #[error("document content is empty")]
    EmptyContent,

    /// The document is larger than the configured limit.
    #[error("document is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// The declared MIME type is not accepted.
    #[error("unsupported content type: {0}")]
    UnsupportedMimeType(String),

    /// The declared MIME type contradicts the format tag.
    #[error("content type {mime_type} does not match document format {format}")]
    FormatMismatch { mime_type: String, format: String },

    /// The bytes look like a different kind of file than the format tag says.
    #[error("content looks like {detected}, expected {format}")]
    ContentMismatch { detected: String, format: String },

    /// Processing options are malformed.
    #[error("invalid processing options: {0}")]
    InvalidOptions(String),
}

/// Errors reported by an OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The request could not be delivered or timed out.
    #[error("request failed: {0}")]
    Request(String),

    /// The collaborator answered with an error or an unreadable body.
    #[error("invalid response: {0}")]
    Response(String),

    /// The collaborator refused the call because of quota limits.
    #[error("rate limited: {0}")]
    RateLimited(String),
}

/// Errors reported by the extraction stage.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The extraction collaborator failed; the message is passed on verbatim.
    #[error("{0}")]
    Provider(String),

    /// The extraction collaborator refused the call because of quota limits.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The returned JSON does not fit the record schema.
    #[error("response does not match {schema} schema: {reason}")]
    InvalidRecord { schema: String, reason: String },
}

/// Result type for the docscan library.
pub type Result<T> = std::result::Result<T, DocscanError>;
