//! Hallucination detector for checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::check::Check;
use crate::models::config::{CheckPatterns, HallucinationConfig};

use super::normalize::{date_matches, digits, digits_match_any, matches_any, normalize_text, parse_dates};
use super::{DecisionPolicy, HallucinationDetector, SuspicionReport, SuspicionSignal};

/// Scores checks against placeholder tables.
pub struct CheckHallucinationDetector {
    patterns: CheckPatterns,
    placeholder_dates: Vec<NaiveDate>,
    policy: DecisionPolicy,
}

impl CheckHallucinationDetector {
    pub fn new(patterns: CheckPatterns, policy: DecisionPolicy) -> Self {
        let mut placeholder_dates: Vec<NaiveDate> = patterns
            .dates
            .iter()
            .flat_map(|d| parse_dates(d))
            .collect();
        placeholder_dates.sort();
        placeholder_dates.dedup();

        Self {
            patterns,
            placeholder_dates,
            policy,
        }
    }

    pub fn from_config(config: &HallucinationConfig) -> Self {
        Self::new(config.check.clone(), DecisionPolicy::from_config(config))
    }

    fn is_placeholder_amount(&self, amount: Decimal) -> bool {
        self.patterns.amounts.iter().any(|a| *a == amount)
    }

    fn is_canonical_example(&self, check: &Check) -> bool {
        let number = check
            .check_number
            .as_deref()
            .is_some_and(|n| {
                let n = digits(n);
                !n.is_empty() && n == digits(&self.patterns.canonical_check_number)
            });
        let payee = check
            .payee
            .as_deref()
            .is_some_and(|p| normalize_text(p) == normalize_text(&self.patterns.canonical_name));
        let amount = check.amount == Some(self.patterns.canonical_amount);

        number && payee && amount
    }
}

impl Default for CheckHallucinationDetector {
    fn default() -> Self {
        Self::from_config(&HallucinationConfig::default())
    }
}

impl HallucinationDetector<Check> for CheckHallucinationDetector {
    fn assess(&self, check: &Check) -> SuspicionReport {
        let p = &self.patterns;
        let mut report = SuspicionReport::new();

        report.flag(
            check.check_number.as_deref().is_some_and(|n| digits_match_any(n, &p.check_numbers)),
            SuspicionSignal::PlaceholderCheckNumber,
        );
        report.flag(
            check.payee.as_deref().is_some_and(|n| matches_any(n, &p.names)),
            SuspicionSignal::PlaceholderPayee,
        );
        report.flag(
            check.payer.as_deref().is_some_and(|n| matches_any(n, &p.names)),
            SuspicionSignal::PlaceholderPayer,
        );
        report.flag(
            check.amount.is_some_and(|a| self.is_placeholder_amount(a)),
            SuspicionSignal::PlaceholderAmount,
        );
        report.flag(
            check
                .date
                .as_deref()
                .is_some_and(|d| date_matches(d, &self.placeholder_dates, &p.dates)),
            SuspicionSignal::PlaceholderDate,
        );
        report.flag(
            check.bank_name.as_deref().is_some_and(|b| matches_any(b, &p.bank_names)),
            SuspicionSignal::GenericBankName,
        );
        report.flag(
            check
                .routing_number
                .as_deref()
                .is_some_and(|r| digits_match_any(r, &p.routing_numbers)),
            SuspicionSignal::PlaceholderRoutingNumber,
        );
        report.flag(
            check.amount.is_some_and(|a| a > Decimal::ZERO) && !check.has_counterparty(),
            SuspicionSignal::AmountWithoutParties,
        );

        if self.is_canonical_example(check) {
            report.add_weighted(SuspicionSignal::CanonicalExample, p.canonical_bonus);
        }

        report
    }

    fn policy(&self) -> DecisionPolicy {
        self.policy
    }
}
