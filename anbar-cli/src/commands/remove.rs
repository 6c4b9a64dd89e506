//! Remove command - remove one drug

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use anbar_core::{events, LogEvent};

pub async fn run(key: &str, force: bool) -> Result<()> {
    let mut ctx = get_context().await?;
    let locale = ctx.config.locale;

    let Some(drug) = ctx.inventory.find(key) else {
        bail!("{}", locale.drug_not_found(key).red());
    };
    let label = format!("{} ({})", drug.name, drug.code);

    // Confirm removal unless --force
    if !force {
        println!("\n{}", format!("This will remove {}.", label).yellow());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.inventory.remove_drug(key).await?;
    log_event(&get_logger(), LogEvent::new(events::DRUG_REMOVED).with_command("remove"));
    println!("\n{} Removed {}\n", "✓".green(), label);

    Ok(())
}
