//! Heuristic screening for fabricated extraction output.
//!
//! Extraction models that cannot ground an answer in the source text tend to
//! return canned values: round amounts, textbook names, `123 Main St`. Each
//! detector scores a record against tables of such values; one point per
//! matched pattern unless noted. A record scoring at or above the threshold is
//! flagged invalid and its confidence is capped.

mod check;
pub mod normalize;
mod receipt;

pub use check::CheckHallucinationDetector;
pub use receipt::ReceiptHallucinationDetector;

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::check::Check;
use crate::models::config::HallucinationConfig;
use crate::models::receipt::Receipt;
use crate::models::record::DocumentRecord;

/// A pattern associated with fabricated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionSignal {
    PlaceholderCheckNumber,
    PlaceholderPayee,
    PlaceholderPayer,
    PlaceholderAmount,
    PlaceholderDate,
    GenericBankName,
    PlaceholderRoutingNumber,
    AmountWithoutParties,
    /// Number, payee and amount of the textbook example check together.
    CanonicalExample,
    GenericMerchantName,
    GenericTotal,
    GenericReceiptNumber,
    GenericMerchantAddress,
    GenericItemDescription,
    SingleItemEqualsTotal,
    NoItemsWithTotal,
    MissingTimestamp,
    /// Rich structured output from an input with no address, phone or items.
    BareInputRichOutput,
}

impl fmt::Display for SuspicionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuspicionSignal::PlaceholderCheckNumber => "placeholder check number",
            SuspicionSignal::PlaceholderPayee => "placeholder payee",
            SuspicionSignal::PlaceholderPayer => "placeholder payer",
            SuspicionSignal::PlaceholderAmount => "placeholder amount",
            SuspicionSignal::PlaceholderDate => "placeholder date",
            SuspicionSignal::GenericBankName => "generic bank name",
            SuspicionSignal::PlaceholderRoutingNumber => "placeholder routing number",
            SuspicionSignal::AmountWithoutParties => "amount without payee or payer",
            SuspicionSignal::CanonicalExample => "textbook example check",
            SuspicionSignal::GenericMerchantName => "generic merchant name",
            SuspicionSignal::GenericTotal => "generic total",
            SuspicionSignal::GenericReceiptNumber => "generic receipt number",
            SuspicionSignal::GenericMerchantAddress => "generic merchant address",
            SuspicionSignal::GenericItemDescription => "generic item description",
            SuspicionSignal::SingleItemEqualsTotal => "single item priced at the total",
            SuspicionSignal::NoItemsWithTotal => "total without items",
            SuspicionSignal::MissingTimestamp => "missing timestamp",
            SuspicionSignal::BareInputRichOutput => "rich output from bare input",
        };
        f.write_str(name)
    }
}

/// Matched signals and their points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuspicionReport {
    hits: Vec<(SuspicionSignal, u32)>,
}

impl SuspicionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a one-point signal.
    pub fn add(&mut self, signal: SuspicionSignal) {
        self.add_weighted(signal, 1);
    }

    pub fn add_weighted(&mut self, signal: SuspicionSignal, points: u32) {
        self.hits.push((signal, points));
    }

    /// Record a one-point signal when `matched` holds.
    pub fn flag(&mut self, matched: bool, signal: SuspicionSignal) {
        if matched {
            self.add(signal);
        }
    }

    /// Accumulated suspicion score.
    pub fn score(&self) -> u32 {
        self.hits.iter().map(|(_, points)| points).sum()
    }

    pub fn signals(&self) -> impl Iterator<Item = SuspicionSignal> + '_ {
        self.hits.iter().map(|(signal, _)| *signal)
    }

    pub fn contains(&self, signal: SuspicionSignal) -> bool {
        self.signals().any(|s| s == signal)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    fn describe(&self) -> String {
        self.signals()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// When to flag a record and how far to demote it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    /// Score at which a record is flagged invalid.
    pub threshold: u32,
    /// Highest confidence a flagged record keeps.
    pub confidence_cap: f64,
}

impl DecisionPolicy {
    pub fn from_config(config: &HallucinationConfig) -> Self {
        Self {
            threshold: config.threshold,
            confidence_cap: config.demoted_confidence_cap,
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::from_config(&HallucinationConfig::default())
    }
}

/// Hallucination detector for one record family.
pub trait HallucinationDetector<R: DocumentRecord>: Send + Sync {
    /// Score a record without touching it.
    fn assess(&self, record: &R) -> SuspicionReport;

    /// Thresholds used by [`HallucinationDetector::detect`].
    fn policy(&self) -> DecisionPolicy;

    /// Screen a record and return it with validity and confidence updated.
    fn detect(&self, record: R) -> R {
        let report = self.assess(&record);
        apply_verdict(record, &report, self.policy())
    }
}

/// Apply the decision rule to a scored record.
///
/// Confidence only ever goes down. A record flagged invalid upstream stays
/// invalid and keeps the demoted cap, whatever the score.
pub fn apply_verdict<R: DocumentRecord>(
    record: R,
    report: &SuspicionReport,
    policy: DecisionPolicy,
) -> R {
    let current = record.confidence();
    let score = report.score();

    if score >= policy.threshold {
        let demoted = current.unwrap_or(0.0).min(policy.confidence_cap);
        warn!(
            "{} record flagged as likely fabricated (score {}: {}), confidence {:?} -> {:.2}",
            R::DOCUMENT_TYPE,
            score,
            report.describe(),
            current,
            demoted
        );
        return record.with_validity(false, Some(demoted));
    }

    if record.is_valid_input() == Some(false) {
        debug!(
            "{} record already flagged invalid upstream (score {})",
            R::DOCUMENT_TYPE,
            score
        );
        let capped = current.map(|c| c.min(policy.confidence_cap));
        return record.with_validity(false, capped);
    }

    if !report.is_empty() {
        debug!(
            "{} record below suspicion threshold (score {}: {})",
            R::DOCUMENT_TYPE,
            score,
            report.describe()
        );
    }
    record.with_validity(true, current)
}

/// Record families with a hallucination detector.
pub trait Screened: DocumentRecord {
    /// Build the family detector from configuration.
    fn detector(config: &HallucinationConfig) -> Box<dyn HallucinationDetector<Self>>;
}

impl Screened for Check {
    fn detector(config: &HallucinationConfig) -> Box<dyn HallucinationDetector<Self>> {
        Box::new(CheckHallucinationDetector::from_config(config))
    }
}

impl Screened for Receipt {
    fn detector(config: &HallucinationConfig) -> Box<dyn HallucinationDetector<Self>> {
        Box::new(ReceiptHallucinationDetector::from_config(config))
    }
}
