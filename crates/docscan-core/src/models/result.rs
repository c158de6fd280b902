//! Stage outputs.

use serde::Serialize;

use super::record::{DocumentRecord, ScannedRecord};

/// Output of a field extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome<R> {
    /// Record after confidence scoring and hallucination screening.
    pub record: R,

    /// Extraction confidence carried by the record.
    pub confidence: f64,
}

/// Final artifact of a successful scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult<R> {
    /// Extracted record.
    pub record: R,

    /// Recognition confidence of the page that was used.
    pub ocr_confidence: f64,

    /// Confidence of the extraction stage.
    pub extraction_confidence: f64,

    /// Blend of OCR and extraction confidence.
    pub overall_confidence: f64,

    /// OCR text handed to the extraction stage.
    pub raw_text: String,
}

impl<R: DocumentRecord> ProcessingResult<R> {
    /// Erase the record family.
    pub fn into_scanned(self) -> ProcessingResult<ScannedRecord> {
        ProcessingResult {
            record: self.record.into_scanned(),
            ocr_confidence: self.ocr_confidence,
            extraction_confidence: self.extraction_confidence,
            overall_confidence: self.overall_confidence,
            raw_text: self.raw_text,
        }
    }

    /// Whether the hallucination screen rejected the input.
    pub fn is_suspicious(&self) -> bool {
        self.record.is_valid_input() == Some(false)
    }
}
