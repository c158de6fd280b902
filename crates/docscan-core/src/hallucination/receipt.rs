//! Hallucination detector for receipts.

use crate::models::config::{HallucinationConfig, ReceiptPatterns};
use crate::models::receipt::Receipt;
use crate::models::record::{is_filled, DocumentRecord};

use super::normalize::{contains_any, matches_any};
use super::{DecisionPolicy, HallucinationDetector, SuspicionReport, SuspicionSignal};

/// Scores receipts against generic-value tables and structural oddities.
pub struct ReceiptHallucinationDetector {
    patterns: ReceiptPatterns,
    policy: DecisionPolicy,
}

impl ReceiptHallucinationDetector {
    pub fn new(patterns: ReceiptPatterns, policy: DecisionPolicy) -> Self {
        Self { patterns, policy }
    }

    pub fn from_config(config: &HallucinationConfig) -> Self {
        Self::new(config.receipt.clone(), DecisionPolicy::from_config(config))
    }

    /// One item carrying the whole (non-trivial) total.
    fn single_item_equals_total(&self, receipt: &Receipt) -> bool {
        let [item] = receipt.items.as_slice() else {
            return false;
        };
        match (item.price(), receipt.totals.total) {
            (Some(price), Some(total)) => {
                price == total && total > self.patterns.single_item_min_total
            }
            _ => false,
        }
    }

    /// Nothing a real receipt prints near the top, yet a full set of
    /// structured output fields.
    fn bare_input_rich_output(&self, receipt: &Receipt) -> bool {
        let bare = !is_filled(&receipt.merchant.address)
            && !is_filled(&receipt.merchant.phone)
            && receipt.items.is_empty();
        if !bare {
            return false;
        }

        let rich_fields = [
            is_filled(&receipt.receipt_number),
            is_filled(&receipt.payment_method),
            is_filled(&receipt.merchant.tax_id),
            is_filled(&receipt.merchant.website),
            receipt.totals.subtotal.is_some(),
            receipt.totals.tax.is_some(),
            receipt.totals.tip.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        rich_fields >= self.patterns.rich_output_min_fields
    }
}

impl Default for ReceiptHallucinationDetector {
    fn default() -> Self {
        Self::from_config(&HallucinationConfig::default())
    }
}

impl HallucinationDetector<Receipt> for ReceiptHallucinationDetector {
    fn assess(&self, receipt: &Receipt) -> SuspicionReport {
        let p = &self.patterns;
        let mut report = SuspicionReport::new();

        report.flag(
            receipt.merchant.name.as_deref().is_some_and(|n| matches_any(n, &p.merchant_names)),
            SuspicionSignal::GenericMerchantName,
        );
        report.flag(
            receipt.totals.total.is_some_and(|t| p.totals.contains(&t)),
            SuspicionSignal::GenericTotal,
        );
        report.flag(
            receipt
                .receipt_number
                .as_deref()
                .is_some_and(|n| matches_any(n, &p.receipt_numbers)),
            SuspicionSignal::GenericReceiptNumber,
        );
        report.flag(
            receipt
                .merchant
                .address
                .as_deref()
                .is_some_and(|a| contains_any(a, &p.address_fragments)),
            SuspicionSignal::GenericMerchantAddress,
        );
        report.flag(
            receipt.items.iter().any(|item| {
                item.description
                    .as_deref()
                    .is_some_and(|d| matches_any(d, &p.item_descriptions))
            }),
            SuspicionSignal::GenericItemDescription,
        );
        report.flag(
            self.single_item_equals_total(receipt),
            SuspicionSignal::SingleItemEqualsTotal,
        );
        report.flag(
            receipt.items.is_empty() && receipt.positive_total().is_some(),
            SuspicionSignal::NoItemsWithTotal,
        );
        report.flag(
            !is_filled(&receipt.timestamp) && receipt.has_populated_fields(),
            SuspicionSignal::MissingTimestamp,
        );
        report.flag(
            self.bare_input_rich_output(receipt),
            SuspicionSignal::BareInputRichOutput,
        );

        report
    }

    fn policy(&self) -> DecisionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::{Merchant, ReceiptItem, ReceiptTotals};
    use rust_decimal::Decimal;

    fn detector() -> ReceiptHallucinationDetector {
        ReceiptHallucinationDetector::default()
    }

    fn item(description: &str, price: Decimal) -> ReceiptItem {
        ReceiptItem {
            description: Some(description.into()),
            quantity: Some(Decimal::ONE),
            unit_price: Some(price),
            total_price: Some(price),
        }
    }

    fn genuine_receipt() -> Receipt {
        Receipt {
            merchant: Merchant {
                name: Some("Corner Bakery".into()),
                address: Some("418 Alder Ave, Portland, OR".into()),
                phone: Some("503-555-0142".into()),
                ..Merchant::default()
            },
            receipt_number: Some("0048213".into()),
            timestamp: Some("2024-03-02 08:14".into()),
            items: vec![
                item("Sourdough loaf", Decimal::new(650, 2)),
                item("Oat latte", Decimal::new(475, 2)),
            ],
            totals: ReceiptTotals {
                subtotal: Some(Decimal::new(1125, 2)),
                tax: Some(Decimal::new(0, 2)),
                total: Some(Decimal::new(1125, 2)),
                ..ReceiptTotals::default()
            },
            payment_method: Some("card".into()),
            ..Receipt::default()
        }
    }

    #[test]
    fn test_genuine_receipt_scores_zero() {
        let report = detector().assess(&genuine_receipt());
        assert_eq!(report.score(), 0, "unexpected signals: {:?}", report);

        let screened = detector().detect(genuine_receipt().with_confidence(0.78));
        assert_eq!(screened.is_valid_input(), Some(true));
        assert_eq!(screened.confidence(), Some(0.78));
    }

    #[test]
    fn test_generic_values() {
        let receipt = Receipt {
            merchant: Merchant {
                name: Some("Store Name".into()),
                address: Some("123 Main St, Anytown".into()),
                ..genuine_receipt().merchant
            },
            receipt_number: Some("REC-001".into()),
            ..genuine_receipt()
        };

        let report = detector().assess(&receipt);
        assert!(report.contains(SuspicionSignal::GenericMerchantName));
        assert!(report.contains(SuspicionSignal::GenericMerchantAddress));
        assert!(report.contains(SuspicionSignal::GenericReceiptNumber));
        assert_eq!(report.score(), 3);
    }

    #[test]
    fn test_generic_total() {
        for total in [Decimal::new(10000, 2), Decimal::new(9999, 2)] {
            let mut receipt = genuine_receipt();
            receipt.totals.total = Some(total);

            let report = detector().assess(&receipt);
            assert!(report.contains(SuspicionSignal::GenericTotal), "total {}", total);
            assert_eq!(report.score(), 1);

            let screened = detector().detect(receipt.with_confidence(0.78));
            assert_eq!(screened.is_valid_input(), Some(true));
        }
    }

    #[test]
    fn test_generic_total_and_merchant_flip_validity() {
        let mut receipt = genuine_receipt();
        receipt.merchant.name = Some("Store Name".into());
        receipt.totals.total = Some(Decimal::new(100, 0));

        let report = detector().assess(&receipt);
        assert!(report.contains(SuspicionSignal::GenericTotal));
        assert!(report.contains(SuspicionSignal::GenericMerchantName));
        assert_eq!(report.score(), 2);

        let screened = detector().detect(receipt.with_confidence(0.78));
        assert_eq!(screened.is_valid_input(), Some(false));
        assert_eq!(screened.confidence(), Some(0.3));
    }

    #[test]
    fn test_generic_items_count_once() {
        let receipt = Receipt {
            items: vec![
                item("Item 1", Decimal::new(500, 2)),
                item("Item 2", Decimal::new(625, 2)),
            ],
            ..genuine_receipt()
        };
        assert_eq!(detector().assess(&receipt).score(), 1);
    }

    #[test]
    fn test_single_item_equals_total() {
        let mut receipt = genuine_receipt();
        receipt.items = vec![item("Birthday cake", Decimal::new(4200, 2))];
        receipt.totals.total = Some(Decimal::new(4200, 2));

        let report = detector().assess(&receipt);
        assert!(report.contains(SuspicionSignal::SingleItemEqualsTotal));

        // A coffee-sized purchase is not over-concentrated.
        receipt.items = vec![item("Espresso", Decimal::new(300, 2))];
        receipt.totals.total = Some(Decimal::new(300, 2));
        let report = detector().assess(&receipt);
        assert!(!report.contains(SuspicionSignal::SingleItemEqualsTotal));
    }

    #[test]
    fn test_total_without_items_and_timestamp() {
        let receipt = Receipt {
            merchant: Merchant {
                name: Some("Corner Bakery".into()),
                ..Merchant::default()
            },
            totals: ReceiptTotals {
                total: Some(Decimal::new(1125, 2)),
                ..ReceiptTotals::default()
            },
            ..Receipt::default()
        }
        .with_confidence(0.78);

        let report = detector().assess(&receipt);
        assert!(report.contains(SuspicionSignal::NoItemsWithTotal));
        assert!(report.contains(SuspicionSignal::MissingTimestamp));

        let screened = detector().detect(receipt);
        assert_eq!(screened.is_valid_input(), Some(false));
        assert_eq!(screened.confidence(), Some(0.3));
    }

    #[test]
    fn test_bare_input_rich_output() {
        let receipt = Receipt {
            merchant: Merchant {
                name: Some("Corner Bakery".into()),
                ..Merchant::default()
            },
            receipt_number: Some("0048213".into()),
            timestamp: Some("2024-03-02 08:14".into()),
            totals: ReceiptTotals {
                subtotal: Some(Decimal::new(1125, 2)),
                tax: Some(Decimal::new(90, 2)),
                tip: Some(Decimal::new(200, 2)),
                total: Some(Decimal::new(1415, 2)),
            },
            payment_method: Some("visa".into()),
            ..Receipt::default()
        };

        let report = detector().assess(&receipt);
        assert!(report.contains(SuspicionSignal::BareInputRichOutput));
        assert!(report.contains(SuspicionSignal::NoItemsWithTotal));
        assert_eq!(report.score(), 2);
    }

    #[test]
    fn test_empty_receipt_is_not_suspicious() {
        let screened = detector().detect(Receipt::default());
        assert_eq!(screened.is_valid_input(), Some(true));
        assert_eq!(screened.confidence(), None);
    }
}
