//! Watch command - record invoices as they land in the folder.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::debug;

use invwatch_core::models::config::StabilizationConfig;
use invwatch_core::InvoiceWatcher;

use super::load_config;

/// Arguments for the watch command.
#[derive(Args, Default)]
pub struct WatchArgs {
    /// Folder to watch
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Ledger file (.xlsx or .csv)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Fixed wait before reading a new file, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

pub async fn run(args: WatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(dir) = args.dir {
        config.watch.directory = dir;
    }
    if let Some(ledger) = args.ledger {
        config.ledger.path = ledger;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.watch.stabilization = StabilizationConfig::FixedDelay { delay_ms };
    }

    let mut watcher =
        InvoiceWatcher::from_config(&config).context("failed to set up invoice pipeline")?;
    watcher.start().context("failed to start watching")?;

    println!(
        "{} Watching {} -> {} (Ctrl-C to stop)",
        style("ℹ").blue(),
        config.watch.directory.display(),
        config.ledger.path.display()
    );

    let idle = config.watch.idle_poll().max(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
            _ = tokio::time::sleep(idle) => {
                debug!("Still watching {}", config.watch.directory.display());
            }
        }
    }

    println!("{} Stopping, finishing any invoice in progress...", style("ℹ").blue());

    // Joining the worker blocks until the in-flight invoice is done.
    tokio::task::spawn_blocking(move || watcher.stop()).await??;

    println!("{} Stopped", style("✓").green());
    Ok(())
}
