//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document scoping and section detection
    #[serde(default)]
    pub parser: ParserConfig,

    /// HTTP and download behavior for icon retrieval
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Default file locations, overridden by CLI flags
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}. Using defaults.", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.parser.start_anchor.trim().is_empty() {
            return Err(AppError::config("parser.start_anchor is empty"));
        }
        if self.parser.official_heading.trim().is_empty() {
            return Err(AppError::config("parser.official_heading is empty"));
        }
        if self.parser.community_heading.trim().is_empty() {
            return Err(AppError::config("parser.community_heading is empty"));
        }
        if self.parser.repo_hosts.is_empty() {
            return Err(AppError::config("parser.repo_hosts must not be empty"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::config("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::config("fetcher.timeout_secs must be > 0"));
        }
        if self.fetcher.concurrency == 0 {
            return Err(AppError::config("fetcher.concurrency must be > 0"));
        }
        Ok(())
    }
}

/// Markers used to scope the document and find the two sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Exact text marking the start of the working scope
    #[serde(default = "defaults::start_anchor")]
    pub start_anchor: String,

    /// Case-insensitive heading substring for the official section
    #[serde(default = "defaults::official_heading")]
    pub official_heading: String,

    /// Case-insensitive heading substring for the community section
    #[serde(default = "defaults::community_heading")]
    pub community_heading: String,

    /// Hosts treated as source repositories
    #[serde(default = "defaults::repo_hosts")]
    pub repo_hosts: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            start_anchor: defaults::start_anchor(),
            official_heading: defaults::official_heading(),
            community_heading: defaults::community_heading(),
            repo_hosts: defaults::repo_hosts(),
        }
    }
}

/// HTTP client and download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum downloads in flight; 1 keeps retrieval sequential
    #[serde(default = "defaults::concurrency")]
    pub concurrency: usize,

    /// Delay between completed records in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Write assets into one subdirectory per category; orders restart per
    /// category, so a combined directory can only hold one of each number
    #[serde(default = "defaults::split_by_category")]
    pub split_by_category: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            concurrency: defaults::concurrency(),
            request_delay_ms: 0,
            split_by_category: defaults::split_by_category(),
        }
    }
}

/// Default input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::input")]
    pub input: String,

    #[serde(default = "defaults::output")]
    pub output: String,

    #[serde(default = "defaults::log")]
    pub log: String,

    /// JSONL file the icon fetcher reads
    #[serde(default = "defaults::icons_input")]
    pub icons_input: String,

    #[serde(default = "defaults::icons_dir")]
    pub icons_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: defaults::input(),
            output: defaults::output(),
            log: defaults::log(),
            icons_input: defaults::icons_input(),
            icons_dir: defaults::icons_dir(),
        }
    }
}

mod defaults {
    use crate::utils::REPO_HOSTS;

    // Parser defaults
    pub fn start_anchor() -> String {
        "## 🤝 Third-Party Servers".into()
    }
    pub fn official_heading() -> String {
        "Official Integrations".into()
    }
    pub fn community_heading() -> String {
        "Community Servers".into()
    }
    pub fn repo_hosts() -> Vec<String> {
        REPO_HOSTS.iter().map(|h| h.to_string()).collect()
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; readme-catalog/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn concurrency() -> usize {
        1
    }
    pub fn split_by_category() -> bool {
        true
    }

    // Path defaults
    pub fn input() -> String {
        "parser/input/modelcontextprotocol-servers-README.md".into()
    }
    pub fn output() -> String {
        "parser/output/catalogItems.jsonl".into()
    }
    pub fn log() -> String {
        "parser/output/parse.log".into()
    }
    pub fn icons_input() -> String {
        "output/catalogItems.jsonl".into()
    }
    pub fn icons_dir() -> String {
        "output/icons".into()
    }
}
