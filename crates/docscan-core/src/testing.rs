//! Scripted collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ExtractionError, OcrError};
use crate::extraction::{ExtractionProvider, ExtractionRequest, ExtractionResponse, ProviderMetadata};
use crate::models::document::Document;
use crate::ocr::{OcrProvider, RecognizedPage};

type OcrScript =
    Box<dyn Fn(&Document) -> Result<Vec<RecognizedPage>, OcrError> + Send + Sync>;

/// OCR collaborator that answers every document from a script and counts
/// calls.
pub struct MockOcr {
    script: OcrScript,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MockOcr {
    pub fn from_fn(
        script: impl Fn(&Document) -> Result<Vec<RecognizedPage>, OcrError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// One page with the given text for every document.
    pub fn page(text: &str, confidence: f64) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(vec![RecognizedPage::new(text.clone(), confidence)]))
    }

    /// No pages for any document.
    pub fn empty() -> Self {
        Self::from_fn(|_| Ok(Vec::new()))
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(OcrError::Request(message.clone())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Display names of every document handed over, in order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrProvider for MockOcr {
    fn name(&self) -> &str {
        "mock-ocr"
    }

    async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<Vec<RecognizedPage>>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut seen = self.seen.lock().unwrap();
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            seen.push(document.display_name().to_string());
            results.push((self.script)(document)?);
        }
        Ok(results)
    }
}

type ExtractionScript =
    Box<dyn Fn(&ExtractionRequest) -> Result<ExtractionResponse, ExtractionError> + Send + Sync>;

/// Extraction collaborator that answers from a script, counts calls and
/// keeps the last request.
pub struct MockExtraction {
    script: ExtractionScript,
    calls: AtomicUsize,
    last_request: Mutex<Option<ExtractionRequest>>,
}

impl MockExtraction {
    pub fn from_fn(
        script: impl Fn(&ExtractionRequest) -> Result<ExtractionResponse, ExtractionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always answer with `json` and the given finish reason.
    pub fn returning(json: Value, finish_reason: &str) -> Self {
        let metadata = ProviderMetadata {
            finish_reason: Some(finish_reason.to_string()),
            ..ProviderMetadata::default()
        };
        Self::from_fn(move |_| {
            Ok(ExtractionResponse {
                json: json.clone(),
                metadata: metadata.clone(),
            })
        })
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(ExtractionError::Provider(message.clone())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ExtractionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionProvider for MockExtraction {
    fn name(&self) -> &str {
        "mock-extraction"
    }

    async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResponse, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = (self.script)(&request);
        *self.last_request.lock().unwrap() = Some(request);
        response
    }
}
