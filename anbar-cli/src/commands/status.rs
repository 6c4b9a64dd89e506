//! Status command - show counting progress and discrepancy totals

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output::format_qty;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let stats = ctx.inventory.stats();
    let last_import = ctx.inventory.last_import_date();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "stats": stats,
                "lastImport": last_import.map(|dt| dt.to_rfc3339()),
                "locale": ctx.config.locale.as_str(),
            })
        );
        return Ok(());
    }

    let labels = ctx.config.locale.summary_labels();
    println!("{}", labels.title.bold());
    println!();

    // Vertical key-value pairs
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![labels.total, &stats.total_items.to_string()]);
    table.add_row(vec![labels.counted, &stats.counted_items.to_string()]);
    table.add_row(vec![labels.matched, &stats.matched_items.to_string()]);
    table.add_row(vec![labels.shortage, &stats.shortage_items.to_string()]);
    table.add_row(vec![labels.surplus, &stats.surplus_items.to_string()]);
    table.add_row(vec![labels.total_difference, &format_qty(stats.total_difference)]);

    println!("{}", table);
    println!();

    match last_import {
        Some(at) => println!("Last import: {}", at.format("%Y-%m-%d %H:%M")),
        None => println!("{}", "No import yet".dimmed()),
    }

    if stats.total_items > 0 && stats.uncounted_items() > 0 {
        println!(
            "{}",
            format!("{} items not counted yet", stats.uncounted_items()).yellow()
        );
    }

    Ok(())
}
