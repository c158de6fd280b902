//! OCR collaborator interface.
//!
//! The pipeline does not recognize text itself. It hands validated documents
//! to an [`OcrProvider`] and reads back one [`RecognizedPage`] per physical
//! page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::document::Document;

/// A recognized text region with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRegion {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Text recognized on one physical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedPage {
    /// Full page text.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f64,

    /// Zero-based page index within the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    /// Page dimensions (width, height) in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,

    /// Text regions with geometry, when the provider reports them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<TextRegion>,
}

impl RecognizedPage {
    /// Create a page from text and confidence.
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            index: None,
            dimensions: None,
            regions: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Recognition confidence clamped to [0, 1]. NaN counts as zero.
    pub fn clamped_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}

/// OCR collaborator.
///
/// The outer vector is indexed by document, the inner one by page. Timeouts
/// and retries belong to the implementation, not to the pipeline.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Recognize text in each document.
    async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<Vec<RecognizedPage>>, OcrError>;
}
