use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;
use crate::files::Parameters;
use crate::parsers::FileType;

/// Application configuration module
/// This module handles loading and validating the settings of a validation run.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path pattern with `{name}` placeholders
    #[serde(default = "default_source")]
    pub source: String,

    /// Value of each placeholder for the base locale
    #[serde(default = "default_parameters")]
    pub parameters: Parameters,

    /// Content format of the matched files
    #[serde(default)]
    pub filetype: FileType,

    /// Element query for xml content
    #[serde(default)]
    pub query: Option<String>,

    /// Render extracted text as Markdown before checking
    #[serde(default)]
    pub render_markdown: bool,

    /// Checks to run, in order
    #[serde(default = "default_checks")]
    pub checks: Vec<CheckKind>,

    /// Hand every file set to each check in a single call
    #[serde(default)]
    pub batch: bool,

    /// URL check settings
    #[serde(default)]
    pub urls: UrlCheckConfig,

    /// Structure check settings
    #[serde(default)]
    pub structure: StructureConfig,

    /// Output format
    #[serde(default)]
    pub report: ReportFormat,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Available checks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Extract and validate links
    Urls,
    /// Compare rendered HTML trees
    Structure,
    /// Compare Markdown rule traces
    Markdown,
    /// Compare format arguments and resource references
    Format,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urls => "urls",
            Self::Structure => "structure",
            Self::Markdown => "markdown",
            Self::Format => "format",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "urls" | "url" => Ok(Self::Urls),
            "structure" => Ok(Self::Structure),
            "markdown" => Ok(Self::Markdown),
            "format" => Ok(Self::Format),
            _ => Err(anyhow::anyhow!("Invalid check type: {}", s)),
        }
    }
}

/// URL check configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UrlCheckConfig {
    /// Extra request headers; a browser-like User-Agent is added unless given
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Total attempts for a URL answering 500
    #[serde(default = "default_retry_max_count")]
    pub retry_max_count: u32,

    /// Maximum number of requests in flight
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base for links starting with `/`; such links are skipped without it
    #[serde(default)]
    pub root_url: Option<String>,

    /// Do not check image sources
    #[serde(default)]
    pub skip_images: bool,
}

impl Default for UrlCheckConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            retry_max_count: default_retry_max_count(),
            max_concurrent_requests: default_max_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            root_url: None,
            skip_images: false,
        }
    }
}

/// Structure check configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StructureConfig {
    /// Ignore bold/italic wrappers when comparing trees
    #[serde(default = "default_true")]
    pub ignore_emphasis: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            ignore_emphasis: true,
        }
    }
}

/// How diagnostics are printed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source() -> String {
    "src/{lang}/*.md".to_string()
}

fn default_parameters() -> Parameters {
    let mut parameters = Parameters::new();
    parameters.insert("lang".to_string(), "en".to_string());
    parameters
}

fn default_checks() -> Vec<CheckKind> {
    vec![CheckKind::Urls, CheckKind::Structure]
}

fn default_true() -> bool {
    true
}

fn default_retry_max_count() -> u32 {
    3
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load a configuration file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Check settings that can be verified without touching the file system
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "source".to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        if self.filetype == FileType::Xml && self.query.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingQuery);
        }

        if self.checks.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "checks".to_string(),
                reason: "no checks selected".to_string(),
            });
        }

        if self.urls.retry_max_count == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "urls.retry_max_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.urls.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "urls.max_concurrent_requests".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(root) = &self.urls.root_url {
            url::Url::parse(root).map_err(|e| ConfigError::InvalidRootUrl {
                url: root.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source: default_source(),
            parameters: default_parameters(),
            filetype: FileType::default(),
            query: None,
            render_markdown: false,
            checks: default_checks(),
            batch: false,
            urls: UrlCheckConfig::default(),
            structure: StructureConfig::default(),
            report: ReportFormat::default(),
            log_level: LogLevel::default(),
        }
    }
}
