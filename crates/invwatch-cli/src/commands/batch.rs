//! Batch command - record invoice images that are already on disk.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use invwatch_core::InvoicePipeline;

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for invoice images, e.g. "invoices/*.png"
    #[arg(required = true)]
    input: String,

    /// Ledger file (.xlsx or .csv)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if let Some(ledger) = args.ledger.clone() {
        config.ledger.path = ledger;
    }

    // Sorted so the ledger order is reproducible.
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && config.watch.accepts(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} invoices to process",
        style("ℹ").blue(),
        files.len()
    );

    let pipeline = InvoicePipeline::from_config(&config).context("failed to set up invoice pipeline")?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} invoices")?
            .progress_chars("=>-"),
    );

    let mut recorded = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for path in &files {
        match pipeline.process(path) {
            Ok(_) => recorded += 1,
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    failed.push((path.clone(), error_msg));
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed after {} invoices: {}", recorded, error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    println!();
    println!(
        "{} Processed {} invoices in {:?}",
        style("✓").green(),
        files.len(),
        start.elapsed()
    );
    println!(
        "   {} recorded in {}, {} failed",
        style(recorded).green(),
        config.ledger.path.display(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}
