//! Core library for document scanning.
//!
//! This crate provides:
//! - Input validation ahead of any collaborator call
//! - OCR and extraction collaborator interfaces
//! - Extraction confidence scoring
//! - Hallucination screening for checks and receipts
//! - Per-family document scanners tying the stages together

pub mod confidence;
pub mod error;
pub mod extraction;
pub mod hallucination;
pub mod models;
pub mod ocr;
pub mod scanner;
pub mod validation;

#[cfg(test)]
mod testing;

pub use confidence::{overall_confidence, ConfidenceCalculator};
pub use error::{DocscanError, ExtractionError, OcrError, Result, ScanError, ValidationError};
pub use extraction::{
    CheckExtractor, ExtractionOptions, ExtractionProvider, ExtractionRequest, ExtractionResponse,
    FieldExtractor, ProviderMetadata, ReceiptExtractor,
};
pub use hallucination::{
    CheckHallucinationDetector, HallucinationDetector, ReceiptHallucinationDetector, Screened,
    SuspicionReport, SuspicionSignal,
};
pub use models::config::ScanConfig;
pub use models::{
    Check, Document, DocumentFormat, DocumentRecord, DocumentType, FieldSchema, ProcessingOptions,
    ProcessingResult, Receipt, ScannedRecord,
};
pub use ocr::{OcrProvider, RecognizedPage, TextRegion};
pub use scanner::{create_scanner, CheckScanner, DocumentScanner, ReceiptScanner, Scanner};
pub use validation::InputValidator;
