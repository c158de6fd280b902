//! Process command - scan a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docscan_core::models::document::ProcessingOptions;
use docscan_core::models::record::{DocumentType, ScannedRecord};
use docscan_core::models::result::ProcessingResult;

use super::{build_scanner, load_config, load_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type (check or receipt)
    #[arg(short = 't', long = "type")]
    document_type: DocumentType,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show confidence scores
    #[arg(long)]
    show_confidence: bool,

    #[command(flatten)]
    ocr: OcrArgs,
}

/// Options forwarded to the OCR service.
#[derive(Args, Clone, Debug, Default)]
pub struct OcrArgs {
    /// Zero-based pages to recognize (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pages: Vec<u32>,

    /// Language hints for recognition (comma-separated, e.g. en,pl)
    #[arg(long = "language", value_delimiter = ',')]
    languages: Vec<String>,
}

impl OcrArgs {
    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            pages: (!self.pages.is_empty()).then(|| self.pages.clone()),
            language_hints: self.languages.clone(),
            ..ProcessingOptions::default()
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let document = load_document(&args.input, &args.ocr.processing_options())?;
    let scanner = build_scanner(args.document_type, &config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Scanning {} as {}...", args.input.display(), args.document_type));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let result = scanner.process_document(&document).await;
    pb.finish_and_clear();
    let result = result?;

    if result.record.is_suspicious() {
        eprintln!(
            "{} Extracted fields look fabricated; treat this result as unreliable",
            style("⚠").yellow()
        );
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        print_confidence(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_confidence(result: &ProcessingResult<ScannedRecord>) {
    println!(
        "{} OCR confidence: {:.0}%",
        style("ℹ").blue(),
        result.ocr_confidence * 100.0
    );
    println!(
        "{} Extraction confidence: {:.0}%",
        style("ℹ").blue(),
        result.extraction_confidence * 100.0
    );
    println!(
        "{} Overall confidence: {:.0}%",
        style("ℹ").blue(),
        result.overall_confidence * 100.0
    );
}

pub fn format_result(
    result: &ProcessingResult<ScannedRecord>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

/// Flat columns of a record, in display order.
pub fn record_columns(record: &ScannedRecord) -> Vec<(&'static str, String)> {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }
    fn number<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    match record {
        ScannedRecord::Check(check) => vec![
            ("check_number", text(&check.check_number)),
            ("date", text(&check.date)),
            ("payee", text(&check.payee)),
            ("payer", text(&check.payer)),
            ("amount", number(&check.amount)),
            ("currency", text(&check.currency)),
            ("bank_name", text(&check.bank_name)),
            ("routing_number", text(&check.routing_number)),
            ("account_number", text(&check.account_number)),
            ("memo", text(&check.memo)),
        ],
        ScannedRecord::Receipt(receipt) => vec![
            ("merchant_name", text(&receipt.merchant.name)),
            ("merchant_address", text(&receipt.merchant.address)),
            ("receipt_number", text(&receipt.receipt_number)),
            ("timestamp", text(&receipt.timestamp)),
            ("items", receipt.items.len().to_string()),
            ("subtotal", number(&receipt.totals.subtotal)),
            ("tax", number(&receipt.totals.tax)),
            ("tip", number(&receipt.totals.tip)),
            ("total", number(&receipt.totals.total)),
            ("currency", text(&receipt.currency)),
            ("payment_method", text(&receipt.payment_method)),
        ],
    }
}

fn format_csv(result: &ProcessingResult<ScannedRecord>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let columns = record_columns(&result.record);
    let trust = result.record.trust();

    let mut header: Vec<&str> = vec!["document_type"];
    header.extend(columns.iter().map(|(name, _)| *name));
    header.extend([
        "is_valid_input",
        "ocr_confidence",
        "extraction_confidence",
        "overall_confidence",
    ]);
    wtr.write_record(&header)?;

    let mut row: Vec<String> = vec![result.record.document_type().to_string()];
    row.extend(columns.into_iter().map(|(_, value)| value));
    row.extend([
        trust.is_valid_input.map(|v| v.to_string()).unwrap_or_default(),
        format!("{:.2}", result.ocr_confidence),
        format!("{:.2}", result.extraction_confidence),
        format!("{:.2}", result.overall_confidence),
    ]);
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ProcessingResult<ScannedRecord>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}:\n", result.record.document_type().schema_name()));

    for (name, value) in record_columns(&result.record) {
        if !value.is_empty() {
            output.push_str(&format!("  {:<18} {}\n", name, value));
        }
    }

    if let Some(receipt) = result.record.as_receipt() {
        if !receipt.items.is_empty() {
            output.push_str("\nItems:\n");
            for item in &receipt.items {
                output.push_str(&format!(
                    "  {:<30} {}\n",
                    item.description.as_deref().unwrap_or("?"),
                    item.price().map(|p| p.to_string()).unwrap_or_default()
                ));
            }
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Confidence: {:.2} (ocr {:.2}, extraction {:.2})\n",
        result.overall_confidence, result.ocr_confidence, result.extraction_confidence
    ));
    if result.record.is_suspicious() {
        output.push_str("Status: suspicious (likely fabricated fields)\n");
    }

    output
}
