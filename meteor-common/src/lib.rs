use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod config;

/// Weight assigned to a target whose configured weight is missing or not positive.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Error types for Meteor Shower operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeteorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file: {0}")]
    ConfigRead(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(String),

    #[error("Failed to write config file: {0}")]
    ConfigWrite(String),

    #[error("File {0} already exists. Use -f to overwrite")]
    ConfigExists(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Failed to write report: {0}")]
    Report(String),
}

/// Result type for Meteor Shower operations
pub type Result<T> = std::result::Result<T, MeteorError>;

pub(crate) fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

/// One endpoint under load, selected in proportion to `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Target {
    pub fn new(url: impl Into<String>, weight: f64) -> Self {
        Self { url: url.into(), weight }
    }
}

/// Report format produced after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

/// Everything the engine needs to run one load test.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTestConfig {
    pub targets: Vec<Target>,
    pub requests_per_second: u32,
    pub concurrency: u32,
    pub duration_seconds: u32,
}

impl LoadTestConfig {
    /// Reject configurations the engine cannot run: zero rate, zero
    /// concurrency, zero duration or an empty target list.
    pub fn validate(&self) -> Result<()> {
        if self.requests_per_second == 0 {
            return Err(MeteorError::InvalidConfig("rps must be greater than 0".to_string()));
        }
        if self.concurrency == 0 {
            return Err(MeteorError::InvalidConfig(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        if self.duration_seconds == 0 {
            return Err(MeteorError::InvalidConfig("duration must be greater than 0".to_string()));
        }
        if self.targets.is_empty() {
            return Err(MeteorError::InvalidConfig(
                "at least one endpoint must be specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on work items a run may dispatch: `rps * duration`.
    pub fn nominal_cap(&self) -> u64 {
        u64::from(self.requests_per_second) * u64::from(self.duration_seconds)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }
}
