//! Configuration structures for the scanning pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DocscanError, Result};

/// Main configuration for the docscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Input validation limits.
    pub validation: ValidationConfig,

    /// Extraction confidence weights.
    pub confidence: ConfidenceConfig,

    /// Hallucination screening thresholds and pattern tables.
    pub hallucination: HallucinationConfig,

    /// Endpoints of the OCR and extraction services.
    pub services: ServiceConfig,
}

/// Input validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest accepted document in bytes.
    pub max_content_bytes: usize,

    /// Declared MIME types accepted by the OCR service.
    pub accepted_mime_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 50 * 1024 * 1024,
            accepted_mime_types: [
                "application/pdf",
                "image/jpeg",
                "image/png",
                "image/webp",
                "image/gif",
                "image/tiff",
                "image/bmp",
                "image/avif",
                "image/heic",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Weights of the extraction confidence blend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Finish reasons that count as a clean termination (case-insensitive).
    pub clean_finish_reasons: Vec<String>,

    /// Signal for a clean termination.
    pub clean_finish_signal: f64,

    /// Signal for any other termination.
    pub degraded_finish_signal: f64,

    /// Signal when the record has at least one populated field.
    pub populated_structure_signal: f64,

    /// Signal when the record is empty.
    pub empty_structure_signal: f64,

    /// Weight of the finish signal in the base score.
    pub finish_weight: f64,

    /// Weight of the structure signal in the base score.
    pub structure_weight: f64,

    /// Multiplier applied when the record is already flagged invalid.
    pub invalid_input_factor: f64,

    /// Weight of the base score when a self-reported confidence is present.
    pub base_blend_weight: f64,

    /// Weight of the self-reported confidence.
    pub self_report_weight: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            clean_finish_reasons: vec!["stop".into(), "end_turn".into(), "completed".into()],
            clean_finish_signal: 1.0,
            degraded_finish_signal: 0.75,
            populated_structure_signal: 0.9,
            empty_structure_signal: 0.3,
            finish_weight: 0.6,
            structure_weight: 0.2,
            invalid_input_factor: 0.3,
            base_blend_weight: 0.8,
            self_report_weight: 0.2,
        }
    }
}

/// Hallucination screening configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HallucinationConfig {
    /// Suspicion score at which a record is flagged invalid.
    pub threshold: u32,

    /// Highest confidence a flagged record may keep.
    pub demoted_confidence_cap: f64,

    /// Placeholder values seen in fabricated checks.
    pub check: CheckPatterns,

    /// Placeholder values seen in fabricated receipts.
    pub receipt: ReceiptPatterns,
}

impl Default for HallucinationConfig {
    fn default() -> Self {
        Self {
            threshold: 2,
            demoted_confidence_cap: 0.3,
            check: CheckPatterns::default(),
            receipt: ReceiptPatterns::default(),
        }
    }
}

/// Placeholder tables for checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPatterns {
    pub check_numbers: Vec<String>,
    pub names: Vec<String>,
    pub amounts: Vec<Decimal>,
    /// Dates in ISO form (`YYYY-MM-DD`) or as printed.
    pub dates: Vec<String>,
    pub bank_names: Vec<String>,
    pub routing_numbers: Vec<String>,

    /// The textbook example check: number, payee and amount together.
    pub canonical_check_number: String,
    pub canonical_name: String,
    pub canonical_amount: Decimal,

    /// Extra points when the canonical triple appears together.
    pub canonical_bonus: u32,
}

impl Default for CheckPatterns {
    fn default() -> Self {
        Self {
            check_numbers: strings(&["1234", "12345", "123456", "0000", "0001", "1001", "9999"]),
            names: strings(&[
                "John Doe",
                "Jane Doe",
                "John Smith",
                "Jane Smith",
                "John Q. Public",
                "Acme Corp",
                "Acme Corporation",
                "ABC Company",
                "XYZ Company",
                "Sample Payee",
                "Payee Name",
                "Your Name",
                "Company Name",
            ]),
            amounts: vec![
                Decimal::new(100, 0),
                Decimal::new(1000, 0),
                Decimal::new(12345, 2),
                Decimal::new(123456, 2),
                Decimal::new(9999, 2),
                Decimal::new(999999, 2),
            ],
            dates: strings(&[
                "2023-01-01",
                "2024-01-01",
                "2025-01-01",
                "2000-01-01",
                "1970-01-01",
                "MM/DD/YYYY",
            ]),
            bank_names: strings(&[
                "Bank",
                "Bank Name",
                "Sample Bank",
                "Example Bank",
                "Your Bank",
                "ABC Bank",
                "XYZ Bank",
                "First National Bank",
                "Bank of Example",
            ]),
            routing_numbers: strings(&[
                "123456789",
                "000000000",
                "111111111",
                "987654321",
                "012345678",
                "123123123",
            ]),
            canonical_check_number: "1234".into(),
            canonical_name: "John Doe".into(),
            canonical_amount: Decimal::new(100, 0),
            canonical_bonus: 2,
        }
    }
}

/// Placeholder tables for receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptPatterns {
    pub merchant_names: Vec<String>,
    pub totals: Vec<Decimal>,
    pub receipt_numbers: Vec<String>,
    /// Fragments that mark an address as a placeholder.
    pub address_fragments: Vec<String>,
    pub item_descriptions: Vec<String>,

    /// A single item priced at the total only counts above this amount.
    pub single_item_min_total: Decimal,

    /// Structured output fields needed to call a bare input over-specified.
    pub rich_output_min_fields: usize,
}

impl Default for ReceiptPatterns {
    fn default() -> Self {
        Self {
            merchant_names: strings(&[
                "Store",
                "Store Name",
                "Sample Store",
                "Example Store",
                "Generic Store",
                "ABC Store",
                "Acme Store",
                "Merchant",
                "Merchant Name",
                "Business Name",
                "Shop",
                "Restaurant",
                "Retail Store",
            ]),
            totals: vec![
                Decimal::new(100, 0),
                Decimal::new(1000, 0),
                Decimal::new(9999, 2),
                Decimal::new(12345, 2),
                Decimal::new(123456, 2),
            ],
            receipt_numbers: strings(&[
                "1234", "12345", "123456", "0001", "000001", "00001", "R12345", "REC-001",
                "RECEIPT-001",
            ]),
            address_fragments: strings(&[
                "123 main st",
                "123 main street",
                "anytown",
                "any city",
                "123 fake st",
                "sample address",
                "street address",
                "city, state",
            ]),
            item_descriptions: strings(&[
                "Item",
                "Item 1",
                "Item 2",
                "Product",
                "Product 1",
                "Sample Item",
                "Example Item",
                "Service",
                "Misc",
                "Miscellaneous",
                "Goods",
            ]),
            single_item_min_total: Decimal::new(5, 0),
            rich_output_min_fields: 3,
        }
    }
}

/// Endpoints of the external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// OCR service endpoint.
    pub ocr_url: String,

    /// Extraction service endpoint.
    pub extraction_url: String,

    /// Environment variable holding the bearer token.
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ocr_url: "http://localhost:8080/v1/ocr".to_string(),
            extraction_url: "http://localhost:8080/v1/extract".to_string(),
            api_key_env: "DOCSCAN_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{ "hallucination": { "threshold": 3 } }"#).unwrap();

        assert_eq!(config.hallucination.threshold, 3);
        assert_eq!(config.hallucination.demoted_confidence_cap, 0.3);
        assert_eq!(config.hallucination.check.canonical_name, "John Doe");
        assert_eq!(config.confidence.finish_weight, 0.6);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ScanConfig::default();
        config.services.timeout_secs = 5;
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.services.timeout_secs, 5);
        assert_eq!(
            loaded.hallucination.check.amounts,
            config.hallucination.check.amounts
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ScanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, DocscanError::Config(_)));
    }
}
