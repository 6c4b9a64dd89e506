//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "app": { "locale": "fa" },
//!   "import": { "headerScanRows": 5, "repairStrategies": ["bytes", "table"] },
//!   "export": { "filePrefix": "anbaryad_export", "includeSummary": true }
//! }
//! ```
//! Every field is optional. Fields this crate does not manage are kept
//! when saving. `ANBAR_LOCALE` and `ANBAR_EXPORT_DIR` override the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Locale;
use crate::services::export::{default_export_dir, DEFAULT_EXPORT_PREFIX};
use crate::services::header::{HeaderKeywords, DEFAULT_HEADER_SCAN_ROWS};
use crate::services::normalize::{RepairStrategy, TextNormalizer};
use crate::services::workbook::ReadOptions;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    import: ImportSettings,
    #[serde(default)]
    export: ExportSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Import pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSettings {
    pub header_scan_rows: usize,
    pub repair_strategies: Vec<RepairStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_encoding: Option<String>,
    #[serde(skip_serializing_if = "HeaderKeywords::is_empty")]
    pub extra_keywords: HeaderKeywords,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            repair_strategies: TextNormalizer::default().strategies().to_vec(),
            fallback_encoding: None,
            extra_keywords: HeaderKeywords::default(),
        }
    }
}

impl ImportSettings {
    pub fn normalizer(&self) -> TextNormalizer {
        TextNormalizer::new(self.repair_strategies.clone())
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::with_fallback_label(self.fallback_encoding.as_deref())
    }
}

/// Report export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub include_summary: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            include_summary: true,
        }
    }
}

/// AnbarYar configuration (resolved view of settings + environment)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub locale: Locale,
    pub import: ImportSettings,
    pub export: ExportSettings,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

/// Data directory from `ANBAR_DIR`, else `~/.anbaryar`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ANBAR_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".anbaryar")
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unparseable settings file yields defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILE))?;

        let file_locale = raw.app.locale.as_deref().and_then(Locale::parse);
        let locale = std::env::var("ANBAR_LOCALE")
            .ok()
            .and_then(|tag| Locale::parse(&tag))
            .or(file_locale)
            .unwrap_or_default();

        let mut export = raw.export.clone();
        if let Ok(dir) = std::env::var("ANBAR_EXPORT_DIR") {
            if !dir.trim().is_empty() {
                export.directory = Some(PathBuf::from(dir));
            }
        }

        Ok(Self {
            locale,
            import: raw.import.clone(),
            export,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        // Load existing settings to preserve fields we don't manage
        let mut settings = read_settings(&settings_path)?;

        settings.app.locale = Some(self.locale.as_str().to_string());
        settings.import = self.import.clone();
        settings.export = self.export.clone();

        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Directory reports are written to
    pub fn export_dir(&self, data_dir: &Path) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| default_export_dir(data_dir))
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid settings.json, using defaults");
        SettingsFile::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Tests here avoid ANBAR_* variables; env overrides are process-global.

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.import.header_scan_rows, 5);
        assert_eq!(
            config.import.repair_strategies,
            vec![RepairStrategy::Bytes, RepairStrategy::Table]
        );
        assert_eq!(config.export.file_prefix, "anbaryad_export");
        assert!(config.export.include_summary);
    }

    #[test]
    fn test_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{
                "import": {
                    "headerScanRows": 8,
                    "repairStrategies": ["table"],
                    "fallbackEncoding": "windows-1256",
                    "extraKeywords": { "code": ["sku"] }
                },
                "export": { "directory": "/tmp/reports", "includeSummary": false }
            }"#,
        )
        .unwrap();

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.import.header_scan_rows, 8);
        assert_eq!(config.import.repair_strategies, vec![RepairStrategy::Table]);
        assert_eq!(config.import.extra_keywords.code, vec!["sku".to_string()]);
        assert!(config.import.read_options().fallback_encoding.is_some());
        assert!(!config.export.include_summary);
        assert_eq!(config.export.file_prefix, "anbaryad_export");
        assert_eq!(config.export_dir(temp.path()), PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("settings.json"), "{oops").unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.import, ImportSettings::default());
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{"app":{"theme":"dark"},"auth":{"user":"x"}}"#,
        )
        .unwrap();

        let mut config = Config::load(temp.path()).unwrap();
        config.set_locale(Locale::En);
        config.save(temp.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(temp.path().join("settings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["app"]["locale"], "en");
        assert_eq!(saved["auth"]["user"], "x");
        assert_eq!(saved["import"]["headerScanRows"], 5);
    }
}
