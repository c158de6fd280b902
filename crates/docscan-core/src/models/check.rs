//! Bank check record.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::record::{is_filled, DocumentRecord, DocumentType, ScannedRecord, TrustFields};

/// Fields extracted from a bank check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    /// Check number printed in the top corner and the MICR line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,

    /// Date written on the check, as printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Pay to the order of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,

    /// Account holder issuing the check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,

    /// Numeric amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Amount written in words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_words: Option<String>,

    /// Issuing bank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    /// ABA routing number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,

    /// Account number from the MICR line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    /// Memo line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// ISO currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(flatten)]
    pub trust: TrustFields,
}

impl Check {
    /// Whether payee or payer carries a name.
    pub fn has_counterparty(&self) -> bool {
        is_filled(&self.payee) || is_filled(&self.payer)
    }
}

impl DocumentRecord for Check {
    const DOCUMENT_TYPE: DocumentType = DocumentType::Check;

    fn trust(&self) -> &TrustFields {
        &self.trust
    }

    fn set_trust(&mut self, trust: TrustFields) {
        self.trust = trust;
    }

    fn has_populated_fields(&self) -> bool {
        [
            &self.check_number,
            &self.date,
            &self.payee,
            &self.payer,
            &self.amount_in_words,
            &self.bank_name,
            &self.routing_number,
            &self.account_number,
            &self.memo,
            &self.currency,
        ]
        .into_iter()
        .any(is_filled)
            || self.amount.is_some()
    }

    fn into_scanned(self) -> ScannedRecord {
        ScannedRecord::Check(self)
    }
}
