//! Logging service - structured event log in logs.jsonl
//!
//! Provides a privacy-safe event log stored as one JSON object per line in
//! the data directory. No inventory data (drug codes, names, quantities,
//! file names) is ever logged.
//!
//! Writes are best-effort from the caller's point of view: commands ignore
//! logging failures.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

const LOG_FILE: &str = "logs.jsonl";

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = now_ms().max(0) as u64;

    // Use lower 48 bits for timestamp (good for ~8900 years)
    // Use upper 16 bits for counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Get current unix timestamp in milliseconds
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    /// Embedded in another application through the library API
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Input kind, e.g. `csv` or `xlsx`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            source: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the input kind
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set error details (additional context)
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the log file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// Event names written by the inventory commands
pub mod events {
    pub const IMPORT_COMPLETED: &str = "import_completed";
    pub const IMPORT_FAILED: &str = "import_failed";
    pub const COUNT_RECORDED: &str = "count_recorded";
    pub const EXPORT_COMPLETED: &str = "export_completed";
    pub const EXPORT_FAILED: &str = "export_failed";
    pub const DRUG_ADDED: &str = "drug_added";
    pub const DRUG_REMOVED: &str = "drug_removed";
    pub const DUPLICATES_REMOVED: &str = "duplicates_removed";
    pub const INVENTORY_CLEARED: &str = "inventory_cleared";

    /// Manual changes to the record set
    pub const EDITS: [&str; 4] = [DRUG_ADDED, DRUG_REMOVED, DUPLICATES_REMOVED, INVENTORY_CLEARED];
}

/// Counting-session activity aggregated from the event log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub imports: u64,
    pub failed_imports: u64,
    pub counts_recorded: u64,
    pub exports: u64,
    pub failed_exports: u64,
    pub edits: u64,
    pub errors: u64,
    pub last_import: Option<i64>,
    pub last_count: Option<i64>,
    pub last_export: Option<i64>,
    /// Completed imports per input kind (`csv`, `xlsx`, ...)
    pub import_sources: BTreeMap<String, u64>,
}

impl ActivitySummary {
    fn record(&mut self, entry: &LogEntry) {
        fn latest(slot: &mut Option<i64>, ts: i64) {
            *slot = Some(slot.map_or(ts, |current| current.max(ts)));
        }

        if entry.error_message.is_some() {
            self.errors += 1;
        }
        match entry.event.as_str() {
            events::IMPORT_COMPLETED => {
                self.imports += 1;
                latest(&mut self.last_import, entry.timestamp);
                if let Some(source) = &entry.source {
                    *self.import_sources.entry(source.clone()).or_default() += 1;
                }
            }
            events::IMPORT_FAILED => self.failed_imports += 1,
            events::COUNT_RECORDED => {
                self.counts_recorded += 1;
                latest(&mut self.last_count, entry.timestamp);
            }
            events::EXPORT_COMPLETED => {
                self.exports += 1;
                latest(&mut self.last_export, entry.timestamp);
            }
            events::EXPORT_FAILED => self.failed_exports += 1,
            event if events::EDITS.contains(&event) => self.edits += 1,
            _ => {}
        }
    }
}

/// Service for structured event logging
pub struct LoggingService {
    lock: Mutex<()>,
    log_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Create a new logging service
    ///
    /// Creates the data directory if needed. The log file itself is created
    /// on the first write.
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        Ok(Self {
            lock: Mutex::new(()),
            log_path: data_dir.join(LOG_FILE),
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    /// Log an event
    ///
    /// The entry_point, app_version, and platform are automatically added
    /// from the service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            command: event.command,
            source: event.source,
            error_message: event.error_message,
            error_details: event.error_details,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open {}", self.log_path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    /// Log a CLI command execution
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Log an error
    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    /// Read every entry, oldest first. Unparseable lines are skipped.
    fn read_all(&self) -> Result<Vec<LogEntry>> {
        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect())
    }

    /// Entries accepted by `filter`, newest first
    pub fn get_matching(
        &self,
        limit: usize,
        filter: impl Fn(&LogEntry) -> bool,
    ) -> Result<Vec<LogEntry>> {
        let mut entries: Vec<LogEntry> = self.read_all()?.into_iter().filter(|e| filter(e)).collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Query recent log entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.get_matching(limit, |_| true)
    }

    /// Query log entries with errors, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.get_matching(limit, |e| e.error_message.is_some())
    }

    /// Totals and latest timestamps per inventory activity
    pub fn activity_summary(&self) -> Result<ActivitySummary> {
        let mut summary = ActivitySummary::default();
        for entry in self.read_all()? {
            summary.record(&entry);
        }
        Ok(summary)
    }

    /// Get the total number of log entries
    pub fn count(&self) -> Result<u64> {
        Ok(self.read_all()?.len() as u64)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let entries = self.read_all()?;
        let (keep, dropped): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.timestamp >= timestamp_ms);

        let mut content = String::new();
        for entry in &keep {
            content.push_str(&serde_json::to_string(entry)?);
            content.push('\n');
        }

        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let tmp = self.log_path.with_extension("jsonl.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.log_path)?;

        Ok(dropped.len() as u64)
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
