use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{default_weight, LoadTestConfig, MeteorError, OutputFormat, Result, Target, DEFAULT_WEIGHT};

/// File names probed in the working directory and in the per-user config directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// Per-user config directory, relative to `$HOME`.
pub const HOME_CONFIG_DIR: &str = ".meteor-shower";

/// Written by `meteor-shower config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# meteor-shower configuration file for load testing
loadtest:
  # Target domain
  domain: "http://localhost:8080"

  # Endpoints with weights
  # Weight determines the distribution of requests across endpoints
  endpoints:
    - path: "/"
      weight: 1.0

  # Example: Multiple endpoints with different weights
  # endpoints:
  #   - path: "/"
  #     weight: 1.0      # Highest frequency
  #   - path: "/health"
  #     weight: 0.5      # Medium frequency
  #   - path: "/slow"
  #     weight: 0.2      # Lowest frequency

  # Requests per second
  rps: 10

  # Number of concurrent clients
  concurrency: 1

  # Test duration in seconds
  duration: 10

  # Output format (html or json)
  output: "html"
"#;

/// On-disk configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub loadtest: LoadTestSection,
}

/// The `loadtest:` section. Every key is optional and falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestSection {
    pub domain: String,
    pub endpoints: Vec<Endpoint>,
    pub rps: u32,
    pub concurrency: u32,
    /// Seconds.
    pub duration: u32,
    pub output: OutputFormat,
}

impl Default for LoadTestSection {
    fn default() -> Self {
        Self {
            domain: "http://localhost:8080".to_string(),
            endpoints: vec![Endpoint { path: "/".to_string(), weight: DEFAULT_WEIGHT }],
            rps: 10,
            concurrency: 1,
            duration: 10,
            output: OutputFormat::Html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Command-line values that take precedence over the file. Numeric values of
/// zero are treated as "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub rps: Option<u32>,
    pub concurrency: Option<u32>,
    pub duration: Option<u32>,
    pub output: Option<OutputFormat>,
}

impl LoadTestSection {
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(rps) = overrides.rps.filter(|v| *v > 0) {
            self.rps = rps;
        }
        if let Some(concurrency) = overrides.concurrency.filter(|v| *v > 0) {
            self.concurrency = concurrency;
        }
        if let Some(duration) = overrides.duration.filter(|v| *v > 0) {
            self.duration = duration;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
    }

    /// Build the engine configuration. Target URLs are `domain + path`; weights
    /// that are not positive become `DEFAULT_WEIGHT`. Does not validate.
    pub fn to_load_test_config(&self) -> LoadTestConfig {
        let targets = self
            .endpoints
            .iter()
            .map(|ep| {
                let weight = if ep.weight > 0.0 { ep.weight } else { DEFAULT_WEIGHT };
                Target::new(format!("{}{}", self.domain, ep.path), weight)
            })
            .collect();

        LoadTestConfig {
            targets,
            requests_per_second: self.rps,
            concurrency: self.concurrency,
            duration_seconds: self.duration,
        }
    }
}

impl FileConfig {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| MeteorError::ConfigParse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MeteorError::ConfigRead(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Load `explicit` if given, otherwise the first existing candidate from
    /// [`candidate_paths`]. With no file at all the defaults are returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading config file");
                Self::from_file(p)
            }
            None => {
                tracing::warn!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Lookup order: working directory first, then `$HOME/.meteor-shower/`.
pub fn candidate_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = CONFIG_FILE_NAMES.iter().map(PathBuf::from).collect();
    if let Some(home) = home {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| home.join(HOME_CONFIG_DIR).join(name)));
    }
    candidates
}

pub fn find_config_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    candidate_paths(home.as_deref()).into_iter().find(|p| p.is_file())
}

/// Write [`DEFAULT_CONFIG_TEMPLATE`] to `path`. Refuses to replace an existing
/// file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(MeteorError::ConfigExists(path.display().to_string()));
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| MeteorError::ConfigWrite(format!("{}: {e}", path.display())))
}
