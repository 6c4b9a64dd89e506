//! AnbarYar CLI - pharmacy inventory counting in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use anbar_core::InventoryFilters;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

use commands::{add, clear, config, count, dedupe, export, import, list, logs, remove, status};

/// AnbarYar - import stock lists, record physical counts, export discrepancy reports
#[derive(Parser)]
#[command(name = "anbar", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import drugs from a CSV or spreadsheet file
    Import {
        /// Path to the .csv, .xlsx, .xls or .ods file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the count report as .xlsx
    Export {
        /// File name prefix (date and extension are appended)
        #[arg(long)]
        prefix: Option<String>,
        /// Write only the detail sheet
        #[arg(long)]
        no_summary: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show counting progress and totals
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List drugs
    List {
        /// Match name or code (case-insensitive)
        #[arg(long, short)]
        search: Option<String>,
        /// Only drugs with a shortage
        #[arg(long)]
        shortage: bool,
        /// Only drugs with a surplus
        #[arg(long)]
        surplus: bool,
        /// Only counted drugs
        #[arg(long)]
        counted: bool,
        /// Only drugs not counted yet
        #[arg(long)]
        uncounted: bool,
        /// Sort by: none, code, name, difference, stock
        #[arg(long, default_value = "none")]
        sort: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a physical count
    Count {
        /// Drug id or code
        drug: String,
        /// Counted quantity
        qty: f64,
        /// Note stored with the drug
        #[arg(long)]
        notes: Option<String>,
    },

    /// Add a drug by hand
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// System quantity
        #[arg(long, default_value = "0")]
        system_qty: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a drug
    Remove {
        /// Drug id or code
        drug: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Delete all drugs
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Drop records that share an id
    Dedupe {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

/// Diagnostics go to stderr, filtered by `ANBAR_LOG` (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ANBAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import { file, json } => import::run(file, json).await,
        Commands::Export { prefix, no_summary, json } => export::run(prefix, no_summary, json).await,
        Commands::Status { json } => status::run(json).await,
        Commands::List { search, shortage, surplus, counted, uncounted, sort, json } => {
            let filters = InventoryFilters {
                show_only_shortage: shortage,
                show_only_surplus: surplus,
                show_only_counted: counted,
                show_only_uncounted: uncounted,
            };
            list::run(list::ListArgs { search, filters, sort, json }).await
        }
        Commands::Count { drug, qty, notes } => count::run(&drug, qty, notes).await,
        Commands::Add { code, name, system_qty, json } => add::run(&code, &name, system_qty, json).await,
        Commands::Remove { drug, force } => remove::run(&drug, force).await,
        Commands::Clear { force } => clear::run(force).await,
        Commands::Dedupe { json } => dedupe::run(json).await,
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
