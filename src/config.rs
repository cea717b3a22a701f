//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pico-coverage.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".pico-coverage.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Search API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the concept list (editorial topics JSON).
    #[serde(default = "default_concepts")]
    pub concepts: String,

    /// Report output path. Derived from the report format when unset.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            concepts: default_concepts(),
            output: None,
        }
    }
}

fn default_concepts() -> String {
    "editorial-topics.json".to_string()
}

/// pico-search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Search endpoint, without query string.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Number of facet values the API computes per facet.
    #[serde(default = "default_facet_size")]
    pub facet_size: u32,

    /// Facet dimensions requested alongside each search.
    #[serde(default = "default_facets")]
    pub facets: Vec<String>,

    /// Content type filter (unencoded URI).
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Results per page. Only the total is read, so this stays small.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page number requested.
    #[serde(default = "default_page_no")]
    pub page_no: u32,

    /// Request timeout in seconds. Client default when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            facet_size: default_facet_size(),
            facets: default_facets(),
            content_type: default_content_type(),
            page_size: default_page_size(),
            page_no: default_page_no(),
            timeout_seconds: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://data.cochrane.org/pico-search".to_string()
}

fn default_facet_size() -> u32 {
    100
}

fn default_facets() -> Vec<String> {
    vec![
        "sex",
        "age",
        "condition",
        "interventionClassification",
        "procedure",
        "material",
        "outcomeClassification",
        "outcomeDomain",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_content_type() -> String {
    "http://data.cochrane.org/ontologies/content/ReviewVersion".to_string()
}

fn default_page_size() -> u32 {
    5
}

fn default_page_no() -> u32 {
    1
}

/// Dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the dashboard listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// SHA-256 hex digest of the shared dashboard password.
    /// The dashboard is open when neither this nor --password is set.
    #[serde(default)]
    pub password_sha256: Option<String>,

    /// Sessions remembered at once; the oldest is dropped beyond this.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            password_sha256: None,
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_max_sessions() -> usize {
    crate::server::gate::MAX_SESSIONS
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref concepts) = args.concepts {
            self.general.concepts = concepts.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(ref base_url) = args.base_url {
            self.api.endpoint = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = Some(timeout);
        }

        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
    }

    /// Effective report path: configured output, else a default named after the format.
    pub fn output_path(&self, format: crate::cli::OutputFormat) -> String {
        self.general
            .output
            .clone()
            .unwrap_or_else(|| format!("pico_coverage.{}", format.extension()))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.concepts, "editorial-topics.json");
        assert_eq!(config.api.endpoint, "https://data.cochrane.org/pico-search");
        assert_eq!(config.api.facet_size, 100);
        assert_eq!(config.api.page_size, 5);
        assert_eq!(config.api.page_no, 1);
        assert_eq!(config.api.facets.len(), 8);
        assert!(config.api.timeout_seconds.is_none());
        assert!(config.server.password_sha256.is_none());
        assert_eq!(config.server.max_sessions, 1024);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
concepts = "topics/editorial.json"
output = "coverage.md"

[api]
endpoint = "http://localhost:9000/pico-search"
facets = ["age"]
timeout_seconds = 20

[server]
bind = "0.0.0.0:8080"
password_sha256 = "abc123"
max_sessions = 16
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.concepts, "topics/editorial.json");
        assert_eq!(config.general.output.as_deref(), Some("coverage.md"));
        assert_eq!(config.api.endpoint, "http://localhost:9000/pico-search");
        assert_eq!(config.api.facets, vec!["age"]);
        assert_eq!(config.api.facet_size, 100);
        assert_eq!(config.api.timeout_seconds, Some(20));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.password_sha256.as_deref(), Some("abc123"));
        assert_eq!(config.server.max_sessions, 16);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\npage_size = 10").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.page_size, 10);
        assert_eq!(config.server.bind, "127.0.0.1:8501");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbroken").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_output_path_follows_format() {
        let mut config = Config::default();
        assert_eq!(config.output_path(OutputFormat::Html), "pico_coverage.html");
        assert_eq!(config.output_path(OutputFormat::Markdown), "pico_coverage.md");
        assert_eq!(config.output_path(OutputFormat::Json), "pico_coverage.json");

        config.general.output = Some("out/report.html".to_string());
        assert_eq!(config.output_path(OutputFormat::Json), "out/report.html");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[server]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.api.facets, Config::default().api.facets);
    }
}
