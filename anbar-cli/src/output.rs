//! Output formatting utilities

use anbar_core::{Drug, DrugStatus, Locale};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format a quantity without a trailing `.0`
pub fn format_qty(qty: f64) -> String {
    format!("{}", qty)
}

/// Colored status label
pub fn status_label(drug: &Drug, locale: Locale) -> String {
    let status = drug.status();
    let label = status.label(locale);
    match status {
        DrugStatus::Matched if !drug.is_counted() => label.dimmed().to_string(),
        DrugStatus::Matched => label.green().to_string(),
        DrugStatus::Surplus(_) => label.yellow().to_string(),
        DrugStatus::Shortage(_) => label.red().to_string(),
    }
}

/// Table of records
pub fn drug_table(drugs: &[Drug], locale: Locale) -> Table {
    let headers = locale.detail_headers();
    let mut table = create_table();
    table.set_header(vec![
        headers[1], headers[2], headers[3], headers[4], headers[5], headers[6],
    ]);

    for drug in drugs {
        table.add_row(vec![
            drug.code.clone(),
            drug.name.clone(),
            format_qty(drug.system_qty()),
            format_qty(drug.physical_qty()),
            format_qty(drug.difference()),
            status_label(drug, locale),
        ]);
    }
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
