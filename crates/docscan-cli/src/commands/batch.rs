//! Batch command - scan many documents, stopping at the first failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use docscan_core::models::record::{DocumentType, ScannedRecord};
use docscan_core::models::result::ProcessingResult;

use super::process::{format_result, record_columns, OcrArgs, OutputFormat};
use super::{build_scanner, is_supported, load_config, load_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern
    #[arg(required = true)]
    input: String,

    /// Document type (check or receipt)
    #[arg(short = 't', long = "type")]
    document_type: DocumentType,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    #[command(flatten)]
    ocr: OcrArgs,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let options = args.ocr.processing_options();
    let documents = files
        .iter()
        .map(|path| load_document(path, &options))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let scanner = build_scanner(args.document_type, &config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Scanning {} documents...", documents.len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let results = scanner.process_documents(&documents).await;
    pb.finish_and_clear();

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            error!("Batch stopped: {}", e);
            anyhow::bail!("Processing failed: {}", e);
        }
    };

    if let Some(output_dir) = &args.output_dir {
        for (path, result) in files.iter().zip(&results) {
            let output_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_result(result, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &files, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let suspicious = results.iter().filter(|r| r.record.is_suspicious()).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    if suspicious > 0 {
        println!(
            "   {} flagged as suspicious",
            style(suspicious).yellow()
        );
    }

    Ok(())
}

fn write_summary(
    path: &Path,
    files: &[PathBuf],
    results: &[ProcessingResult<ScannedRecord>],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let Some(first) = results.first() else {
        return Ok(());
    };

    let mut header: Vec<&str> = vec!["filename"];
    header.extend(record_columns(&first.record).iter().map(|(name, _)| *name));
    header.extend(["is_valid_input", "overall_confidence"]);
    wtr.write_record(&header)?;

    for (file, result) in files.iter().zip(results) {
        let filename = file.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let mut row = vec![filename.to_string()];
        row.extend(record_columns(&result.record).into_iter().map(|(_, v)| v));
        row.push(
            result
                .record
                .trust()
                .is_valid_input
                .map(|v| v.to_string())
                .unwrap_or_default(),
        );
        row.push(format!("{:.2}", result.overall_confidence));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
