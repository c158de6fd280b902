//! Field extraction for one document family.

use std::sync::Arc;

use tracing::debug;

use crate::confidence::ConfidenceCalculator;
use crate::error::ExtractionError;
use crate::hallucination::{HallucinationDetector, Screened};
use crate::models::check::Check;
use crate::models::config::ScanConfig;
use crate::models::receipt::Receipt;
use crate::models::record::DocumentRecord;
use crate::models::result::ExtractionOutcome;
use crate::models::schema::FieldSchema;

use super::{ExtractionOptions, ExtractionProvider, ExtractionRequest};

/// Turns recognized text into a scored, screened record of family `R`.
pub struct FieldExtractor<R: Screened> {
    provider: Arc<dyn ExtractionProvider>,
    schema: FieldSchema,
    calculator: ConfidenceCalculator,
    detector: Box<dyn HallucinationDetector<R>>,
    options: ExtractionOptions,
}

/// Extractor for bank checks.
pub type CheckExtractor = FieldExtractor<Check>;

/// Extractor for receipts.
pub type ReceiptExtractor = FieldExtractor<Receipt>;

impl<R: Screened> FieldExtractor<R> {
    /// Create an extractor with the family detector and weights from `config`.
    pub fn new(provider: Arc<dyn ExtractionProvider>, config: &ScanConfig) -> Self {
        Self {
            provider,
            schema: R::schema(),
            calculator: ConfidenceCalculator::new(config.confidence.clone()),
            detector: R::detector(&config.hallucination),
            options: ExtractionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract a record from recognized text.
    ///
    /// Collaborator errors are returned unchanged. The record is scored
    /// before screening, so the detector sees (and may only lower) the
    /// calculated confidence.
    pub async fn extract_from_text(
        &self,
        text: &str,
    ) -> Result<ExtractionOutcome<R>, ExtractionError> {
        let request = ExtractionRequest {
            text: text.to_string(),
            schema: self.schema.clone(),
            options: self.options.clone(),
        };

        debug!(
            "Extracting {} fields from {} chars with {}",
            self.schema.name,
            text.len(),
            self.provider.name()
        );
        let response = self.provider.extract(request).await?;

        let record: R =
            serde_json::from_value(response.json).map_err(|e| ExtractionError::InvalidRecord {
                schema: self.schema.name.to_string(),
                reason: e.to_string(),
            })?;

        let calculated = self.calculator.calculate(&response.metadata, &record);
        debug!(
            "{} extraction scored {} (finish reason {:?})",
            self.schema.name, calculated, response.metadata.finish_reason
        );

        let record = self.detector.detect(record.with_confidence(calculated));
        let confidence = record.confidence().unwrap_or(calculated);

        Ok(ExtractionOutcome { record, confidence })
    }
}
