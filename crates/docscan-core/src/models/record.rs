//! Shared behaviour of extracted records.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::check::Check;
use super::receipt::Receipt;
use super::schema::FieldSchema;

/// Document families the pipeline knows how to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Bank check.
    Check,
    /// Store or restaurant receipt.
    Receipt,
}

impl DocumentType {
    /// All supported families.
    pub const ALL: [DocumentType; 2] = [DocumentType::Check, DocumentType::Receipt];

    /// Name of the schema sent to the extraction collaborator.
    pub fn schema_name(&self) -> &'static str {
        match self {
            DocumentType::Check => "Check",
            DocumentType::Receipt => "Receipt",
        }
    }

    /// Lowercase identifier used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Check => "check",
            DocumentType::Receipt => "receipt",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "check" | "cheque" => Ok(DocumentType::Check),
            "receipt" => Ok(DocumentType::Receipt),
            other => {
                let known: Vec<_> = DocumentType::ALL.iter().map(|t| t.as_str()).collect();
                Err(format!(
                    "unknown document type '{}', expected one of: {}",
                    other,
                    known.join(", ")
                ))
            }
        }
    }
}

/// Synthetic trust fields the pipeline adds to every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrustFields {
    /// Whether the input looked like a genuine document (unset, true, false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_valid_input: Option<bool>,

    /// Confidence in the record (0.0 - 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A typed record produced by the extraction collaborator.
///
/// Domain fields are fixed once the record is deserialized. Only the trust
/// fields change afterwards, and only through the `with_*` transforms, which
/// hand back a new record.
pub trait DocumentRecord:
    Serialize + DeserializeOwned + JsonSchema + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Family this record belongs to.
    const DOCUMENT_TYPE: DocumentType;

    /// Trust fields of this record.
    fn trust(&self) -> &TrustFields;

    /// Replace the trust fields.
    fn set_trust(&mut self, trust: TrustFields);

    /// Whether at least one domain field carries a value.
    fn has_populated_fields(&self) -> bool;

    /// Wrap into the family-independent enum.
    fn into_scanned(self) -> ScannedRecord;

    /// Schema sent to the extraction collaborator.
    fn schema() -> FieldSchema {
        FieldSchema::for_type::<Self>(Self::DOCUMENT_TYPE.schema_name())
    }

    fn confidence(&self) -> Option<f64> {
        self.trust().confidence
    }

    fn is_valid_input(&self) -> Option<bool> {
        self.trust().is_valid_input
    }

    /// Copy of the record with a new confidence.
    fn with_confidence(mut self, confidence: f64) -> Self {
        let trust = TrustFields {
            confidence: Some(confidence),
            ..*self.trust()
        };
        self.set_trust(trust);
        self
    }

    /// Copy of the record with a new validity flag and confidence.
    fn with_validity(mut self, is_valid: bool, confidence: Option<f64>) -> Self {
        self.set_trust(TrustFields {
            is_valid_input: Some(is_valid),
            confidence,
        });
        self
    }
}

/// A record of any supported family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "documentType", rename_all = "snake_case")]
pub enum ScannedRecord {
    Check(Check),
    Receipt(Receipt),
}

impl ScannedRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ScannedRecord::Check(_) => DocumentType::Check,
            ScannedRecord::Receipt(_) => DocumentType::Receipt,
        }
    }

    pub fn trust(&self) -> &TrustFields {
        match self {
            ScannedRecord::Check(check) => check.trust(),
            ScannedRecord::Receipt(receipt) => receipt.trust(),
        }
    }

    /// Whether the hallucination screen rejected the input.
    pub fn is_suspicious(&self) -> bool {
        self.trust().is_valid_input == Some(false)
    }

    pub fn as_receipt(&self) -> Option<&Receipt> {
        match self {
            ScannedRecord::Receipt(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// A text field counts as populated when it has non-blank content.
pub(crate) fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Read an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
