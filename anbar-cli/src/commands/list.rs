//! List command - search, filter and sort the record set

use anyhow::{anyhow, Result};
use anbar_core::{InventoryFilters, SortBy};

use super::get_context;
use crate::output;

pub struct ListArgs {
    pub search: Option<String>,
    pub filters: InventoryFilters,
    pub sort: String,
    pub json: bool,
}

pub async fn run(args: ListArgs) -> Result<()> {
    let ctx = get_context().await?;
    let sort: SortBy = args.sort.parse().map_err(|e: String| anyhow!(e))?;

    let view = ctx
        .inventory
        .filtered(args.search.as_deref().unwrap_or(""), &args.filters, sort);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No drugs found.");
        return Ok(());
    }

    println!("{}", output::drug_table(&view, ctx.config.locale));
    println!("{} of {} items", view.len(), ctx.inventory.drugs().len());
    Ok(())
}
