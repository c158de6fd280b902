//! Document scanners: validate, recognize, extract.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::confidence::{overall_confidence, round2};
use crate::error::ScanError;
use crate::extraction::{ExtractionProvider, FieldExtractor};
use crate::hallucination::Screened;
use crate::models::check::Check;
use crate::models::config::ScanConfig;
use crate::models::document::Document;
use crate::models::receipt::Receipt;
use crate::models::record::{DocumentType, ScannedRecord};
use crate::models::result::ProcessingResult;
use crate::ocr::OcrProvider;
use crate::validation::InputValidator;

/// Scanner for one document family.
///
/// Each scan runs validate, recognize and extract in order and stops at the
/// first failing stage. Nothing is retried.
pub struct Scanner<R: Screened> {
    validator: InputValidator,
    ocr: Arc<dyn OcrProvider>,
    extractor: FieldExtractor<R>,
}

/// Scanner for bank checks.
pub type CheckScanner = Scanner<Check>;

/// Scanner for receipts.
pub type ReceiptScanner = Scanner<Receipt>;

impl<R: Screened> Scanner<R> {
    pub fn new(
        ocr: Arc<dyn OcrProvider>,
        extraction: Arc<dyn ExtractionProvider>,
        config: &ScanConfig,
    ) -> Self {
        Self::from_parts(
            InputValidator::new(config.validation.clone()),
            ocr,
            FieldExtractor::new(extraction, config),
        )
    }

    /// Assemble a scanner from already configured stages.
    pub fn from_parts(
        validator: InputValidator,
        ocr: Arc<dyn OcrProvider>,
        extractor: FieldExtractor<R>,
    ) -> Self {
        Self {
            validator,
            ocr,
            extractor,
        }
    }

    /// Scan a single document.
    pub async fn process_document(
        &self,
        document: &Document,
    ) -> Result<ProcessingResult<R>, ScanError> {
        let name = document.display_name();
        info!("Scanning {} as {}", name, R::DOCUMENT_TYPE);

        let result = self.scan(document).await;
        match &result {
            Ok(result) => info!(
                "Scanned {}: overall confidence {:.2}{}",
                name,
                result.overall_confidence,
                if result.is_suspicious() { " (suspicious)" } else { "" }
            ),
            Err(e) => warn!("Scan of {} failed at {} stage: {}", name, e.stage(), e),
        }
        result
    }

    /// Scan documents one after another, stopping at the first failure.
    ///
    /// The error of the failing document is returned alone; later documents
    /// are never sent to a collaborator.
    pub async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<ProcessingResult<R>>, ScanError> {
        let mut results = Vec::with_capacity(documents.len());
        for (i, document) in documents.iter().enumerate() {
            debug!("Batch document {}/{}", i + 1, documents.len());
            results.push(self.process_document(document).await?);
        }
        Ok(results)
    }

    async fn scan(&self, document: &Document) -> Result<ProcessingResult<R>, ScanError> {
        let document = self.validator.validate(document)?;

        debug!("Recognizing text with {}", self.ocr.name());
        let pages = self
            .ocr
            .process_documents(std::slice::from_ref(document))
            .await?;

        let page_count = pages.first().map_or(0, Vec::len);
        let page = pages
            .into_iter()
            .next()
            .and_then(|pages| pages.into_iter().next())
            .ok_or(ScanError::EmptyRecognition)?;
        if page_count > 1 {
            debug!("Using the first of {} recognized pages", page_count);
        }

        let ocr_confidence = round2(page.clamped_confidence());
        debug!(
            "Recognized {} chars (confidence {:.2})",
            page.text.len(),
            ocr_confidence
        );

        let outcome = self.extractor.extract_from_text(&page.text).await?;
        let extraction_confidence = round2(outcome.confidence.clamp(0.0, 1.0));

        Ok(ProcessingResult {
            record: outcome.record,
            ocr_confidence,
            extraction_confidence,
            overall_confidence: overall_confidence(ocr_confidence, extraction_confidence),
            raw_text: page.text,
        })
    }
}

/// Family-independent scanner interface.
#[async_trait]
pub trait DocumentScanner: Send + Sync {
    /// Family this scanner produces.
    fn document_type(&self) -> DocumentType;

    async fn process_document(
        &self,
        document: &Document,
    ) -> Result<ProcessingResult<ScannedRecord>, ScanError>;

    async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<ProcessingResult<ScannedRecord>>, ScanError>;
}

#[async_trait]
impl<R: Screened> DocumentScanner for Scanner<R> {
    fn document_type(&self) -> DocumentType {
        R::DOCUMENT_TYPE
    }

    async fn process_document(
        &self,
        document: &Document,
    ) -> Result<ProcessingResult<ScannedRecord>, ScanError> {
        Scanner::process_document(self, document)
            .await
            .map(ProcessingResult::into_scanned)
    }

    async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<ProcessingResult<ScannedRecord>>, ScanError> {
        let results = Scanner::process_documents(self, documents).await?;
        Ok(results.into_iter().map(ProcessingResult::into_scanned).collect())
    }
}

/// Create the scanner for a document family.
pub fn create_scanner(
    document_type: DocumentType,
    ocr: Arc<dyn OcrProvider>,
    extraction: Arc<dyn ExtractionProvider>,
    config: &ScanConfig,
) -> Box<dyn DocumentScanner> {
    match document_type {
        DocumentType::Check => Box::new(CheckScanner::new(ocr, extraction, config)),
        DocumentType::Receipt => Box::new(ReceiptScanner::new(ocr, extraction, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, OcrError, ValidationError};
    use crate::extraction::{ExtractionResponse, ProviderMetadata};
    use crate::ocr::RecognizedPage;
    use crate::testing::{MockExtraction, MockOcr};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CHECK_TEXT: &str = "5120\nPAY TO THE ORDER OF Northside Plumbing LLC $245.17";

    fn genuine_check_json() -> serde_json::Value {
        json!({
            "checkNumber": "5120",
            "payee": "Northside Plumbing LLC",
            "payer": "Maria Lopez",
            "amount": 245.17,
            "date": "March 14, 2024"
        })
    }

    fn check_scanner(ocr: &Arc<MockOcr>, extraction: &Arc<MockExtraction>) -> CheckScanner {
        CheckScanner::new(ocr.clone(), extraction.clone(), &ScanConfig::default())
    }

    fn document(name: &str) -> Document {
        Document::image(b"scanned-bytes".to_vec()).with_name(name)
    }

    #[tokio::test]
    async fn test_full_scan() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.95));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let result = scanner.process_document(&document("check.jpg")).await.unwrap();

        assert_eq!(result.ocr_confidence, 0.95);
        assert_eq!(result.extraction_confidence, 0.78);
        // 0.6 * 0.95 + 0.4 * 0.78
        assert_eq!(result.overall_confidence, 0.88);
        assert_eq!(result.raw_text, CHECK_TEXT);
        assert_eq!(result.record.payee.as_deref(), Some("Northside Plumbing LLC"));
        assert!(!result.is_suspicious());
        assert_eq!(extraction.last_request().unwrap().text, CHECK_TEXT);
    }

    #[tokio::test]
    async fn test_overall_blend_with_provider_confidence() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.95));
        let extraction = Arc::new(MockExtraction::from_fn(|_| {
            Ok(ExtractionResponse {
                json: json!({ "payee": "Northside Plumbing LLC" }),
                metadata: ProviderMetadata {
                    finish_reason: Some("stop".into()),
                    confidence: Some(1.0),
                    model: None,
                },
            })
        }));
        let scanner = check_scanner(&ocr, &extraction);

        let result = scanner.process_document(&document("check.jpg")).await.unwrap();

        // 0.8 * 0.78 + 0.2 * 1.0
        assert_eq!(result.extraction_confidence, 0.82);
        assert_eq!(result.overall_confidence, 0.9);
    }

    #[tokio::test]
    async fn test_ocr_confidence_is_clamped_and_rounded() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 1.3));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let result = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap();
        assert_eq!(result.ocr_confidence, 1.0);

        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.876));
        let result = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap();
        assert_eq!(result.ocr_confidence, 0.88);
    }

    #[tokio::test]
    async fn test_validation_gate() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.95));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let err = scanner
            .process_document(&Document::image(Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Validation(ValidationError::EmptyContent)));
        assert!(err.to_string().starts_with("Validation failed: "));
        assert_eq!(ocr.calls(), 0);
        assert_eq!(extraction.calls(), 0);
    }

    #[tokio::test]
    async fn test_ocr_failure() {
        let ocr = Arc::new(MockOcr::failing("connection refused"));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let err = scanner.process_document(&document("check.jpg")).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "OCR processing failed: request failed: connection refused"
        );
        assert_eq!(extraction.calls(), 0);
    }

    #[tokio::test]
    async fn test_ocr_empty_results() {
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));

        let ocr = Arc::new(MockOcr::empty());
        let err = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OCR processing returned empty results");

        let ocr = Arc::new(MockOcr::from_fn(|_| Err(OcrError::RateLimited("429".into()))));
        let err = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("OCR processing failed: "));
        assert_eq!(extraction.calls(), 0);
    }

    #[tokio::test]
    async fn test_only_first_page_is_used() {
        let ocr = Arc::new(MockOcr::from_fn(|_| {
            Ok(vec![
                RecognizedPage::new("front", 0.9).with_index(0),
                RecognizedPage::new("back", 0.4).with_index(1),
            ])
        }));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let result = check_scanner(&ocr, &extraction)
            .process_document(&document("check.pdf"))
            .await
            .unwrap();

        assert_eq!(result.raw_text, "front");
        assert_eq!(result.ocr_confidence, 0.9);
    }

    #[tokio::test]
    async fn test_extraction_failure() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.95));
        let extraction = Arc::new(MockExtraction::from_fn(|_| {
            Err(ExtractionError::Provider("model overloaded".into()))
        }));
        let err = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Data extraction failed: model overloaded");
        assert_eq!(err.stage(), "extract");
    }

    #[tokio::test]
    async fn test_suspicious_result_is_still_ok() {
        let ocr = Arc::new(MockOcr::page("blurry", 0.5));
        let extraction = Arc::new(MockExtraction::returning(
            json!({ "checkNumber": "1234", "payee": "John Doe", "amount": 100 }),
            "stop",
        ));
        let result = check_scanner(&ocr, &extraction)
            .process_document(&document("check.jpg"))
            .await
            .unwrap();

        assert!(result.is_suspicious());
        assert_eq!(result.extraction_confidence, 0.3);
        // 0.6 * 0.5 + 0.4 * 0.3
        assert_eq!(result.overall_confidence, 0.42);
    }

    #[tokio::test]
    async fn test_batch_fails_fast() {
        let ocr = Arc::new(MockOcr::page(CHECK_TEXT, 0.95));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let batch = [
            Document::image(Vec::new()).with_name("bad.jpg"),
            document("good.jpg"),
        ];
        let err = scanner.process_documents(&batch).await.unwrap_err();

        assert!(err.to_string().starts_with("Validation failed: "));
        assert_eq!(ocr.calls(), 0);
        assert_eq!(extraction.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_stops_at_collaborator_failure() {
        let ocr = Arc::new(MockOcr::from_fn(|doc| match doc.name() {
            Some("second.jpg") => Err(OcrError::Response("unreadable".into())),
            _ => Ok(vec![RecognizedPage::new(CHECK_TEXT, 0.9)]),
        }));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let batch = [document("first.jpg"), document("second.jpg"), document("third.jpg")];
        let err = scanner.process_documents(&batch).await.unwrap_err();

        assert!(matches!(err, ScanError::Recognition(_)));
        assert_eq!(ocr.seen(), vec!["first.jpg", "second.jpg"]);
        assert_eq!(extraction.calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_success_keeps_order() {
        let ocr = Arc::new(MockOcr::from_fn(|doc| {
            Ok(vec![RecognizedPage::new(doc.display_name().to_string(), 0.9)])
        }));
        let extraction = Arc::new(MockExtraction::returning(genuine_check_json(), "stop"));
        let scanner = check_scanner(&ocr, &extraction);

        let batch = [document("a.jpg"), document("b.jpg")];
        let results = scanner.process_documents(&batch).await.unwrap();

        let texts: Vec<_> = results.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_factory_selects_family() {
        let ocr: Arc<dyn OcrProvider> = Arc::new(MockOcr::page("CORNER BAKERY", 0.9));
        let extraction: Arc<dyn ExtractionProvider> = Arc::new(MockExtraction::returning(
            json!({
                "merchant": { "name": "Corner Bakery", "phone": "503-555-0142" },
                "timestamp": "2024-03-02 08:14",
                "items": [
                    { "description": "Sourdough loaf", "totalPrice": 6.5 },
                    { "description": "Oat latte", "totalPrice": 4.75 }
                ],
                "totals": { "total": 11.25 }
            }),
            "stop",
        ));

        let scanner = create_scanner(
            DocumentType::Receipt,
            ocr,
            extraction,
            &ScanConfig::default(),
        );
        assert_eq!(scanner.document_type(), DocumentType::Receipt);

        let result = scanner.process_document(&document("receipt.jpg")).await.unwrap();
        let receipt = result.record.as_receipt().unwrap();
        assert_eq!(receipt.items.len(), 2);
        assert!(!result.record.is_suspicious());
        assert_eq!(result.overall_confidence, 0.85);
    }
}
