//! Count command - record a physical count for one drug

use anyhow::Result;
use colored::Colorize;
use anbar_core::DrugUpdate;

use super::{get_context, get_logger, log_event};
use crate::output::{format_qty, status_label};
use anbar_core::{events, LogEvent};

pub async fn run(key: &str, qty: f64, notes: Option<String>) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context().await?;
    let locale = ctx.config.locale;

    let update = DrugUpdate {
        notes,
        ..DrugUpdate::physical(qty)
    };
    let drug = ctx.inventory.update_drug(key, update).await?;
    log_event(&logger, LogEvent::new(events::COUNT_RECORDED).with_command("count"));

    println!(
        "\n{} {} ({}): {} / {} → {}\n",
        "✓".green(),
        drug.name,
        drug.code.dimmed(),
        format_qty(drug.physical_qty()),
        format_qty(drug.system_qty()),
        status_label(&drug, locale)
    );
    Ok(())
}
