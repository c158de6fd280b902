//! Extraction confidence scoring.

use tracing::trace;

use crate::extraction::ProviderMetadata;
use crate::models::config::ConfidenceConfig;
use crate::models::record::DocumentRecord;

/// Weight of the OCR confidence in the overall blend.
pub const OCR_WEIGHT: f64 = 0.6;

/// Weight of the extraction confidence in the overall blend.
pub const EXTRACTION_WEIGHT: f64 = 0.4;

/// Blends extraction-stage signals into a single confidence.
///
/// The calculator holds only its weights, so the same metadata and record
/// always produce the same value.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceCalculator {
    config: ConfidenceConfig,
}

impl ConfidenceCalculator {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// Score an extracted record.
    pub fn calculate<R: DocumentRecord>(&self, metadata: &ProviderMetadata, record: &R) -> f64 {
        let c = &self.config;

        let finish = if self.is_clean_finish(metadata.finish_reason.as_deref()) {
            c.clean_finish_signal
        } else {
            c.degraded_finish_signal
        };

        let structure = if record.has_populated_fields() {
            c.populated_structure_signal
        } else {
            c.empty_structure_signal
        };

        let mut base = c.finish_weight * finish + c.structure_weight * structure;

        if record.is_valid_input() == Some(false) {
            base *= c.invalid_input_factor;
        }

        let in_range = |v: &f64| (0.0..=1.0).contains(v);
        let self_reported = record
            .confidence()
            .filter(in_range)
            .or(metadata.confidence.filter(in_range));

        let value = match self_reported {
            Some(reported) => c.base_blend_weight * base + c.self_report_weight * reported,
            None => base,
        };

        let score = round2(value.clamp(0.0, 1.0));
        trace!(
            "confidence: finish={} structure={} self={:?} -> {}",
            finish,
            structure,
            self_reported,
            score
        );
        score
    }

    fn is_clean_finish(&self, reason: Option<&str>) -> bool {
        reason.is_some_and(|r| {
            let r = r.trim();
            self.config
                .clean_finish_reasons
                .iter()
                .any(|clean| clean.eq_ignore_ascii_case(r))
        })
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Blend OCR and extraction confidence into the overall score.
pub fn overall_confidence(ocr: f64, extraction: f64) -> f64 {
    round2((OCR_WEIGHT * ocr + EXTRACTION_WEIGHT * extraction).clamp(0.0, 1.0))
}
