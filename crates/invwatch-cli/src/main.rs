//! CLI application that watches a folder for invoice images.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, process, watch};

/// Invoice folder watcher - OCR new invoice images into a spreadsheet ledger
#[derive(Parser)]
#[command(name = "invwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the invoice folder until Ctrl-C (default)
    Watch(watch::WatchArgs),

    /// Process a single invoice image
    Process(process::ProcessArgs),

    /// Process existing invoice images matching a glob
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Status notices are info events, so info is the default.
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Commands::Watch(args)) => watch::run(args, config_path).await,
        None => watch::run(watch::WatchArgs::default(), config_path).await,
        Some(Commands::Process(args)) => process::run(args, config_path).await,
        Some(Commands::Batch(args)) => batch::run(args, config_path).await,
        Some(Commands::Config(args)) => config::run(args, config_path).await,
    }
}
