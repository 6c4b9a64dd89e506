//! Dedupe command - drop records sharing an id

use anyhow::Result;

use super::{get_context, get_logger, log_event};
use anbar_core::{events, LogEvent};
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let mut ctx = get_context().await?;
    let removed = ctx.inventory.remove_duplicates().await?;
    if removed > 0 {
        log_event(&get_logger(), LogEvent::new(events::DUPLICATES_REMOVED).with_command("dedupe"));
    }

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else if removed == 0 {
        output::info("No duplicate records found");
    } else {
        output::success(&format!("Removed {} duplicate records", removed));
    }
    Ok(())
}
