//! Data models for documents, records and configuration.

pub mod check;
pub mod config;
pub mod document;
pub mod receipt;
pub mod record;
pub mod result;
pub mod schema;

pub use check::Check;
pub use document::{Document, DocumentFormat, ProcessingOptions};
pub use receipt::{Merchant, Receipt, ReceiptItem, ReceiptTotals};
pub use record::{DocumentRecord, DocumentType, ScannedRecord, TrustFields};
pub use result::{ExtractionOutcome, ProcessingResult};
pub use schema::FieldSchema;
