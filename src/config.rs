use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde::Serialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which calendar to read and how far ahead
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Where the service-account key comes from
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Where the rendered page goes
    #[serde(default)]
    pub output: OutputConfig,
}

/// Calendar query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar to list events from
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Length of the forward window in days
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Maximum number of events requested
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Credential lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable holding the JSON key
    #[serde(default = "default_credentials_env")]
    pub env_var: String,

    /// Key file used when the variable is not set
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// HTML file overwritten on every run
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Page heading and document title
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            window_days: default_window_days(),
            max_results: default_max_results(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_var: default_credentials_env(),
            path: default_credentials_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            title: default_title(),
        }
    }
}

impl CalendarConfig {
    /// Reject windows and limits the Calendar API cannot serve
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            bail!(
                "calendar.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS,
                self.window_days
            );
        }
        if !(1..=MAX_RESULTS).contains(&self.max_results) {
            bail!(
                "calendar.max_results must be between 1 and {}, got {}",
                MAX_RESULTS,
                self.max_results
            );
        }
        Ok(())
    }
}

/// Upper bound for the forward window, roughly a century
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Largest page size `events.list` accepts
pub const MAX_RESULTS: usize = 2_500;

// Defaults
fn default_calendar_id() -> String {
    "momsphotoframe517@gmail.com".to_string()
}

fn default_window_days() -> i64 {
    365
}

fn default_max_results() -> usize {
    8
}

fn default_credentials_env() -> String {
    "GOOGLE_CREDENTIALS".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("birthdays.html")
}

fn default_title() -> String {
    "Birthdays".to_string()
}

/// Load the configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let config_str = read_to_string(path)
        .context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&config_str)
        .context("Failed to parse config file")?;

    config.calendar.validate()
        .context("Invalid config file")?;

    Ok(config)
}

/// Build the configuration used when no file is given
pub fn create_default_config() -> AppConfig {
    AppConfig {
        calendar: CalendarConfig::default(),
        credentials: CredentialsConfig::default(),
        output: OutputConfig::default(),
    }
}

/// Write a sample configuration file filled with the defaults
pub fn generate_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = create_default_config();
    let toml_str = toml::to_string_pretty(&config)
        .context("Failed to serialize config")?;

    std::fs::write(path, toml_str)
        .context("Failed to write sample config file")?;

    Ok(())
}
