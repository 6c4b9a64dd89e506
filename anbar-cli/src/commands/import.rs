//! Import command - import a stock list from CSV or a spreadsheet

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;

use super::{get_context, get_logger, log_event, spinner};
use crate::output;
use anbar_core::services::workbook::source_kind;
use anbar_core::{events, LogEvent};

pub async fn run(file: PathBuf, json: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context().await?;
    let locale = ctx.inventory.locale();
    let source = source_kind(&file);

    let bar = spinner(&format!("Importing {}", file.display()), json);
    let result = ctx.inventory.import_file(&file).await;
    bar.finish_and_clear();

    if result.success {
        log_event(
            &logger,
            LogEvent::new(events::IMPORT_COMPLETED)
                .with_command("import")
                .with_source(source),
        );
    } else {
        log_event(
            &logger,
            LogEvent::new(events::IMPORT_FAILED)
                .with_command("import")
                .with_source(source)
                .with_error(result.errors.first().cloned().unwrap_or_default()),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    for warning in &result.warnings {
        output::warning(warning);
    }
    for error in &result.errors {
        output::error(error);
    }

    if !result.success {
        bail!("{}", "Import failed".red());
    }

    output::success(&locale.imported(result.imported_count));
    let stats = ctx.inventory.stats();
    println!("{}", format!("Total items: {}", stats.total_items).dimmed());
    Ok(())
}
