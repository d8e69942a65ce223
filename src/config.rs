//! Config file loading and validation.
//!
//! The config is loaded once at startup and is immutable for the process
//! lifetime. Unknown fields and schema violations are fatal with a
//! descriptive message.

use crate::condition::Condition;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level config: polling interval plus the watched spreadsheets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    pub spreadsheets: Vec<SourceConfig>,
}

fn default_interval() -> u64 {
    10
}

/// One external data source: a spreadsheet plus one of its worksheets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub spreadsheet_id: String,
    /// Worksheet name used to qualify every monitored range.
    pub worksheet_id: String,
    pub monitors: Vec<MonitorConfig>,
}

/// One watched range plus its rule set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Range specifier within the worksheet, e.g. "A1:B4".
    pub range: String,
    pub conditions: Vec<Condition>,
    /// Optional debounce window in seconds.
    #[serde(default)]
    pub debounce: Option<u64>,
    /// Optional SMS alert rule; without it a rising edge is only logged.
    #[serde(default)]
    pub sms: Option<AlertRule>,
}

impl MonitorConfig {
    pub fn debounce_window(&self) -> Option<chrono::Duration> {
        self.debounce.map(|secs| chrono::Duration::seconds(secs as i64))
    }
}

/// SMS alert rule: sender, one or many receivers, message template with
/// `{value}` and `{range}` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertRule {
    pub from: String,
    pub to: Receivers,
    pub text: String,
}

/// Receiver field that accepts either a single id or a list of ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Receivers {
    One(String),
    Many(Vec<String>),
}

impl Receivers {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Receivers::One(receiver) => std::slice::from_ref(receiver),
            Receivers::Many(receivers) => receivers,
        }
    }
}

impl Config {
    /// Load and validate a config file. Any failure here is fatal.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid(
                "interval must be at least 1 second".to_string(),
            ));
        }
        for (s, source) in self.spreadsheets.iter().enumerate() {
            if source.spreadsheet_id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "spreadsheets[{s}]: spreadsheet_id must not be empty"
                )));
            }
            if source.worksheet_id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "spreadsheets[{s}]: worksheet_id must not be empty"
                )));
            }
            for (m, monitor) in source.monitors.iter().enumerate() {
                if monitor.range.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "spreadsheets[{s}].monitors[{m}]: range must not be empty"
                    )));
                }
                if let Some(sms) = &monitor.sms {
                    if sms.from.is_empty() {
                        return Err(ConfigError::Invalid(format!(
                            "spreadsheets[{s}].monitors[{m}].sms: from must not be empty"
                        )));
                    }
                    if sms.to.as_slice().is_empty()
                        || sms.to.as_slice().iter().any(|r| r.is_empty())
                    {
                        return Err(ConfigError::Invalid(format!(
                            "spreadsheets[{s}].monitors[{m}].sms: to must list at least one non-empty receiver"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Total monitor count across all sources.
    pub fn monitor_count(&self) -> usize {
        self.spreadsheets.iter().map(|s| s.monitors.len()).sum()
    }
}
