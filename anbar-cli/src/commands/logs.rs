//! Logs command - counting-session activity from the event log

use anyhow::Result;
use chrono::{Duration, Local, TimeZone, Utc};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::Confirm;

use super::get_logger;
use crate::output;
use anbar_core::{events, ActivitySummary, LogEntry, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent inventory activity
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "30")]
        limit: usize,
        /// Only one kind of activity
        #[arg(long, value_enum)]
        activity: Option<Activity>,
        /// Only failed operations
        #[arg(long)]
        failed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop activity older than N days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Session totals: imports, counts, exports, edits
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Activity groups shown by `logs list --activity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Activity {
    Import,
    Count,
    Export,
    Edit,
}

impl Activity {
    fn of(event: &str) -> Option<Self> {
        match event {
            events::IMPORT_COMPLETED | events::IMPORT_FAILED => Some(Activity::Import),
            events::COUNT_RECORDED => Some(Activity::Count),
            events::EXPORT_COMPLETED | events::EXPORT_FAILED => Some(Activity::Export),
            e if events::EDITS.contains(&e) => Some(Activity::Edit),
            _ => None,
        }
    }
}

/// Human wording for an event name
fn describe(event: &str) -> &str {
    match event {
        events::IMPORT_COMPLETED => "stock list imported",
        events::IMPORT_FAILED => "import rejected",
        events::COUNT_RECORDED => "count recorded",
        events::EXPORT_COMPLETED => "report exported",
        events::EXPORT_FAILED => "export failed",
        events::DRUG_ADDED => "drug added",
        events::DRUG_REMOVED => "drug removed",
        events::DUPLICATES_REMOVED => "duplicates removed",
        events::INVENTORY_CLEARED => "inventory cleared",
        other => other,
    }
}

fn local_time(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn open_log() -> Result<LoggingService> {
    get_logger().ok_or_else(|| anyhow::anyhow!("Event log is not available"))
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List { limit, activity, failed, json } => list(limit, activity, failed, json),
        LogsCommands::Clear { older_than_days, force } => clear(older_than_days, force),
        LogsCommands::Stats { json } => stats(json),
    }
}

fn list(limit: usize, activity: Option<Activity>, failed: bool, json: bool) -> Result<()> {
    let log = open_log()?;
    let entries = log.get_matching(limit, |entry: &LogEntry| {
        let kind = Activity::of(&entry.event);
        kind.is_some()
            && activity.map_or(true, |wanted| kind == Some(wanted))
            && (!failed || entry.error_message.is_some())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::info("No inventory activity recorded yet");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["When", "Activity", "Input", "Outcome"]);
    for entry in &entries {
        let outcome = match &entry.error_message {
            Some(message) => message.red().to_string(),
            None => "ok".green().to_string(),
        };
        table.add_row(vec![
            local_time(entry.timestamp),
            describe(&entry.event).to_string(),
            entry.source.clone().unwrap_or_default(),
            outcome,
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(older_than_days: i64, force: bool) -> Result<()> {
    let log = open_log()?;
    let cutoff = Utc::now() - Duration::days(older_than_days.clamp(0, 36_500));

    if !force
        && !Confirm::new()
            .with_prompt(format!("Drop activity before {}?", cutoff.format("%Y-%m-%d")))
            .default(false)
            .interact()?
    {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let deleted = log.delete_before(cutoff.timestamp_millis())?;
    output::success(&format!("Dropped {} log entries", deleted));
    Ok(())
}

fn stats(json: bool) -> Result<()> {
    let log = open_log()?;
    let summary = log.activity_summary()?;

    if json {
        let mut value = serde_json::to_value(&summary)?;
        value["logPath"] = serde_json::json!(log.path().to_string_lossy());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_summary(&summary);

    let size = std::fs::metadata(log.path()).map(|m| m.len()).unwrap_or(0);
    println!(
        "{}",
        format!("Log: {} ({})", log.path().display(), output::format_size(size)).dimmed()
    );
    Ok(())
}

fn print_summary(summary: &ActivitySummary) {
    let last = |at: Option<i64>| at.map(local_time).unwrap_or_else(|| "never".to_string());
    let failed = |n: u64| {
        if n == 0 {
            String::new()
        } else {
            format!(" ({} failed)", n).red().to_string()
        }
    };

    println!("{}", "Counting activity".bold());
    println!(
        "  Imports:  {}{}  last {}",
        summary.imports,
        failed(summary.failed_imports),
        last(summary.last_import)
    );
    if !summary.import_sources.is_empty() {
        let sources: Vec<String> = summary
            .import_sources
            .iter()
            .map(|(kind, n)| format!("{} {}", kind, n))
            .collect();
        println!("            {}", sources.join(", ").dimmed());
    }
    println!(
        "  Counts:   {}  last {}",
        summary.counts_recorded,
        last(summary.last_count)
    );
    println!(
        "  Exports:  {}{}  last {}",
        summary.exports,
        failed(summary.failed_exports),
        last(summary.last_export)
    );
    println!("  Edits:    {}", summary.edits);
    if summary.errors > 0 {
        println!("  {}", format!("{} operations reported an error", summary.errors).red());
    }
}
