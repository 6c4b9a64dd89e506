//! Config command - show settings and change the display language

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use anbar_core::config::Config;
use anbar_core::Locale;

use super::get_data_dir;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the language of messages and reports (fa, en)
    SetLocale {
        locale: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir();
    let mut config = Config::load(&data_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let export_dir = config.export_dir(&data_dir);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "dataDir": data_dir.to_string_lossy(),
                        "locale": config.locale.as_str(),
                        "import": config.import,
                        "exportDir": export_dir.to_string_lossy(),
                        "export": config.export,
                    })
                );
                return Ok(());
            }

            println!("{}", "Settings".bold());
            println!("  Data directory: {}", data_dir.display());
            println!("  Locale: {}", config.locale.as_str());
            println!("  Header scan rows: {}", config.import.header_scan_rows);
            println!(
                "  Repair strategies: {}",
                serde_json::to_string(&config.import.repair_strategies)?
            );
            if let Some(encoding) = &config.import.fallback_encoding {
                println!("  Fallback encoding: {}", encoding);
            }
            println!("  Export directory: {}", export_dir.display());
            println!("  Export prefix: {}", config.export.file_prefix);
            println!("  Summary sheet: {}", config.export.include_summary);
        }
        ConfigCommands::SetLocale { locale } => {
            let parsed = Locale::parse(&locale)
                .ok_or_else(|| anyhow!("Unknown locale '{}', expected fa or en", locale))?;
            config.set_locale(parsed);
            config.save(&data_dir)?;
            println!("{} Locale set to {}", "✓".green(), parsed.as_str());
        }
    }
    Ok(())
}
