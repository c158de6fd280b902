//! Extraction collaborator interface and per-family field extractors.

mod extractor;

pub use extractor::{CheckExtractor, FieldExtractor, ReceiptExtractor};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractionError;
use crate::models::schema::FieldSchema;

/// Knobs forwarded to the extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOptions {
    /// Model to ask for, when the collaborator serves several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Languages the text is expected to be in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language_hints: Vec<String>,
}

/// A request for schema-guided extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRequest {
    /// Recognized text.
    pub text: String,

    /// Shape of the record to produce.
    pub schema: FieldSchema,

    #[serde(skip_serializing_if = "is_default_options")]
    pub options: ExtractionOptions,
}

fn is_default_options(options: &ExtractionOptions) -> bool {
    *options == ExtractionOptions::default()
}

/// What the provider reports about how the extraction went.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    /// Why generation stopped (`stop`, `length`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Self-assessed confidence, if the provider offers one.
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
}

/// Raw collaborator answer: an untyped field set plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub json: Value,

    #[serde(default)]
    pub metadata: ProviderMetadata,
}

/// Extraction collaborator.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Turn recognized text into a field set shaped by `request.schema`.
    async fn extract(&self, request: ExtractionRequest)
        -> Result<ExtractionResponse, ExtractionError>;
}
