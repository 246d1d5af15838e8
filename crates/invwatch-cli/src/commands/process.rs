//! Process command - run one invoice image through the pipeline.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use invwatch_core::{InvoicePipeline, InvoiceRecord};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Invoice image (png, jpg, jpeg)
    #[arg(required = true)]
    input: PathBuf,

    /// Ledger file (.xlsx or .csv)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Print the extracted record without writing it to the ledger
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct ProcessOutput<'a> {
    #[serde(flatten)]
    record: &'a InvoiceRecord,
    processed_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger: Option<String>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if let Some(ledger) = args.ledger.clone() {
        config.ledger.path = ledger;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if !config.watch.accepts(&args.input) {
        anyhow::bail!(
            "Unsupported file format: {} (accepted: {})",
            args.input.display(),
            config.watch.extensions.join(", ")
        );
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = InvoicePipeline::from_config(&config).context("failed to set up invoice pipeline")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Reading {}", args.input.display()));

    let result = if args.dry_run {
        pipeline.extract(&args.input)
    } else {
        pipeline.process(&args.input)
    };
    pb.finish_and_clear();

    let record = result.with_context(|| format!("failed to process {}", args.input.display()))?;
    let ledger = (!args.dry_run).then(|| config.ledger.path.display().to_string());

    match args.format {
        OutputFormat::Json => {
            let output = ProcessOutput {
                record: &record,
                processed_at: Local::now(),
                ledger,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Image:       {}", record.image_name);
            println!("Description: {}", record.description);
            println!(
                "Total:       {}",
                record
                    .total_sum
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "not found".to_string())
            );
            match ledger {
                Some(path) => println!("{} Added to {}", style("✓").green(), path),
                None => println!("{} Dry run, ledger not updated", style("ℹ").blue()),
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
