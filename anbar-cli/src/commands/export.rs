//! Export command - write the reconciled report workbook

use anyhow::Result;
use colored::Colorize;

use super::{get_context, get_logger, log_event, spinner};
use anbar_core::{events, LogEvent};

pub async fn run(prefix: Option<String>, no_summary: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context().await?;

    let summary = if no_summary { Some(false) } else { None };
    let bar = spinner("Writing report", json);
    let exported = ctx.inventory.export_report(prefix.as_deref(), summary).await;
    bar.finish_and_clear();

    let path = match exported {
        Ok(path) => path,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new(events::EXPORT_FAILED)
                    .with_command("export")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new(events::EXPORT_COMPLETED).with_command("export"));

    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.to_string_lossy(),
                "items": ctx.inventory.drugs().len(),
            })
        );
    } else {
        println!("\n{} Report written to {}\n", "✓".green(), path.display());
    }
    Ok(())
}
