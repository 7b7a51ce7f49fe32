//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/ticketdash/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/ticketdash/` (~/.config/ticketdash/)
//! - Data: `$XDG_DATA_HOME/ticketdash/` (~/.local/share/ticketdash/)
//! - State/Logs: `$XDG_STATE_HOME/ticketdash/` (~/.local/state/ticketdash/)
//!
//! Every field has a default, so an absent or partial file is valid. The
//! defaults match the column layout of the exported ticket log.

use crate::error::{Error, Result};
use crate::types::Column;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "ticketdash";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(fallback))
}

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Header names of the columns the analytics read
    #[serde(default)]
    pub columns: ColumnNames,

    /// Status labels and divisors used by the aggregator
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Header names for each known column of the export.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ColumnNames {
    #[serde(default = "default_month_column")]
    pub month: String,
    #[serde(default = "default_client_column")]
    pub client: String,
    #[serde(default = "default_analyst_column")]
    pub analyst: String,
    #[serde(default = "default_work_item_column")]
    pub work_item_type: String,
    #[serde(default = "default_tags_column")]
    pub tags: String,
    #[serde(default = "default_status_column")]
    pub status: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            month: default_month_column(),
            client: default_client_column(),
            analyst: default_analyst_column(),
            work_item_type: default_work_item_column(),
            tags: default_tags_column(),
            status: default_status_column(),
        }
    }
}

impl ColumnNames {
    /// Header name configured for `column`.
    pub fn header(&self, column: Column) -> &str {
        match column {
            Column::Month => &self.month,
            Column::Client => &self.client,
            Column::Analyst => &self.analyst,
            Column::WorkItemType => &self.work_item_type,
            Column::Tags => &self.tags,
            Column::Status => &self.status,
        }
    }

    /// Which known column a header cell names, if any.
    pub fn column_for(&self, header: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|column| self.header(*column) == header)
    }
}

fn default_month_column() -> String {
    "Created Date".to_string()
}

fn default_client_column() -> String {
    "Cliente".to_string()
}

fn default_analyst_column() -> String {
    "Assigned To".to_string()
}

fn default_work_item_column() -> String {
    "Work Item Type".to_string()
}

fn default_tags_column() -> String {
    "Tags".to_string()
}

fn default_status_column() -> String {
    "State".to_string()
}

/// Aggregation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Business days per period, divisor for the daily average
    #[serde(default = "default_working_days")]
    pub working_days: u32,

    /// Length of the client and tag rankings
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Status meaning "escalated to engineering" (case-insensitive)
    #[serde(default = "default_escalated_status")]
    pub escalated_status: String,

    /// Closed/resolved statuses (case-insensitive)
    #[serde(default = "default_terminal_statuses")]
    pub terminal_statuses: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            working_days: default_working_days(),
            top_n: default_top_n(),
            escalated_status: default_escalated_status(),
            terminal_statuses: default_terminal_statuses(),
        }
    }
}

impl AnalyticsConfig {
    /// Whether `status` is the escalation label.
    pub fn is_escalated(&self, status: &str) -> bool {
        status.trim().to_uppercase() == self.escalated_status.trim().to_uppercase()
    }

    /// Whether `status` is one of the closed/resolved labels.
    pub fn is_terminal(&self, status: &str) -> bool {
        let status = status.trim().to_uppercase();
        self.terminal_statuses
            .iter()
            .any(|label| label.trim().to_uppercase() == status)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.working_days == 0 {
            return Err(Error::Config(
                "analytics.working_days must be greater than zero".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(Error::Config(
                "analytics.top_n must be greater than zero".to_string(),
            ));
        }
        if self.escalated_status.trim().is_empty() {
            return Err(Error::Config(
                "analytics.escalated_status must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_working_days() -> u32 {
    21
}

fn default_top_n() -> usize {
    5
}

fn default_escalated_status() -> String {
    "Escalonado Engenharia".to_string()
}

fn default_terminal_statuses() -> Vec<String> {
    vec!["Fechado".to_string(), "Resolvido".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.analytics.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/ticketdash/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config")
            .join(APP_DIR)
            .join("config.toml")
    }

    /// `$XDG_DATA_HOME/ticketdash/`
    pub fn data_dir() -> PathBuf {
        xdg_dir("XDG_DATA_HOME", ".local/share").join(APP_DIR)
    }

    /// `$XDG_STATE_HOME/ticketdash/`
    pub fn state_dir() -> PathBuf {
        xdg_dir("XDG_STATE_HOME", ".local/state").join(APP_DIR)
    }

    /// Key-value store holding the imported log and cached snapshot
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("ticketdash.db")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// Called by the CLI before anything reads these variables.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        for (var, fallback) in [
            ("XDG_DATA_HOME", ".local/share"),
            ("XDG_STATE_HOME", ".local/state"),
            ("XDG_CONFIG_HOME", ".config"),
        ] {
            if std::env::var(var).is_err() {
                std::env::set_var(var, home.join(fallback));
            }
        }
    }
}
