//! Clear command - delete every drug and the import history

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use anbar_core::{events, LogEvent};

pub async fn run(force: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context().await?;
    let total = ctx.inventory.drugs().len();

    if !force {
        println!("\n{}", format!("This will delete all {} drugs.", total).yellow());
        println!("{}\n", "Export a report first if you need the counts.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.inventory.clear().await?;
    log_event(&logger, LogEvent::new(events::INVENTORY_CLEARED).with_command("clear"));
    println!("\n{} Cleared {} drugs\n", "✓".green(), total);
    Ok(())
}
