//! Add command - add a drug by hand

use anyhow::Result;
use colored::Colorize;

use super::{get_context, get_logger, log_event};
use anbar_core::{events, LogEvent};

pub async fn run(code: &str, name: &str, system_qty: f64, json: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context().await?;
    let drug = ctx.inventory.add_drug(code, name, system_qty).await?;
    log_event(&logger, LogEvent::new(events::DRUG_ADDED).with_command("add"));

    if json {
        println!("{}", serde_json::to_string_pretty(&drug)?);
    } else {
        println!("\n{} Added {} ({})\n", "✓".green(), drug.name, drug.code);
    }
    Ok(())
}
