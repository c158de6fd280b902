//! Store receipt record.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::record::{
    is_filled, null_as_default, DocumentRecord, DocumentType, ScannedRecord, TrustFields,
};

/// Fields extracted from a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Merchant information.
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant: Merchant,

    /// Receipt or transaction number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,

    /// Date and time of the purchase, as printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Purchased items.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub items: Vec<ReceiptItem>,

    /// Totals block.
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals: ReceiptTotals,

    /// ISO currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Payment method (cash, card, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(flatten)]
    pub trust: TrustFields,
}

/// Merchant block at the top of a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// VAT or tax registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

impl Merchant {
    pub fn is_empty(&self) -> bool {
        !is_filled(&self.name)
            && !is_filled(&self.address)
            && !is_filled(&self.phone)
            && !is_filled(&self.website)
            && !is_filled(&self.tax_id)
    }
}

/// A single purchased item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line total (quantity times unit price, after discounts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

impl ReceiptItem {
    /// Price charged for this line.
    pub fn price(&self) -> Option<Decimal> {
        self.total_price.or(self.unit_price)
    }
}

/// Totals block at the bottom of a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTotals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

impl ReceiptTotals {
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_none() && self.tax.is_none() && self.tip.is_none() && self.total.is_none()
    }
}

impl Receipt {
    /// Total amount when it is strictly positive.
    pub fn positive_total(&self) -> Option<Decimal> {
        self.totals.total.filter(|t| t.is_sign_positive() && !t.is_zero())
    }
}

impl DocumentRecord for Receipt {
    const DOCUMENT_TYPE: DocumentType = DocumentType::Receipt;

    fn trust(&self) -> &TrustFields {
        &self.trust
    }

    fn set_trust(&mut self, trust: TrustFields) {
        self.trust = trust;
    }

    fn has_populated_fields(&self) -> bool {
        !self.merchant.is_empty()
            || !self.items.is_empty()
            || !self.totals.is_empty()
            || is_filled(&self.receipt_number)
            || is_filled(&self.timestamp)
            || is_filled(&self.currency)
            || is_filled(&self.payment_method)
    }

    fn into_scanned(self) -> ScannedRecord {
        ScannedRecord::Receipt(self)
    }
}
