//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// PICO Coverage - concept coverage dashboard for the Cochrane pico-search API
///
/// Fetches the number of reviews matching each editorial concept and renders
/// bar charts per PICO category plus a treemap, either as a standalone report
/// or as a password-gated web dashboard.
///
/// Examples:
///   pico-coverage --concepts editorial-topics.json
///   pico-coverage --format markdown -o coverage.md
///   pico-coverage --serve --bind 0.0.0.0:8501 --password s3cret
///   pico-coverage --dry-run
///   pico-coverage --init-config
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Concept list (JSON with a `results` array of {label, linkSuffix})
    ///
    /// Default: from config or editorial-topics.json
    #[arg(long, value_name = "FILE")]
    pub concepts: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pico-coverage.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// pico-search endpoint URL (without query string)
    #[arg(long, value_name = "URL", env = "PICO_BASE_URL")]
    pub base_url: Option<String>,

    /// Output file path for the report
    ///
    /// Default: pico_coverage.{html,md,json} depending on --format
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, markdown, json)
    #[arg(long, default_value = "html", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Serve the dashboard over HTTP instead of writing a report
    #[arg(long, conflicts_with = "dry_run")]
    pub serve: bool,

    /// Address the dashboard listens on
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Shared dashboard password
    ///
    /// Takes precedence over server.password_sha256 in the config file.
    #[arg(long, value_name = "SECRET", env = "PICO_DASHBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds (client default when unset)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Dry run: classify concepts and print request URLs without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .pico-coverage.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML dashboard (default)
    #[default]
    Html,
    /// Markdown tables
    Markdown,
    /// JSON coverage table
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("concepts", &self.concepts)
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .field("output", &self.output)
            .field("format", &self.format)
            .field("serve", &self.serve)
            .field("bind", &self.bind)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .field("init_config", &self.init_config)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        if let Some(ref password) = self.password {
            if password.is_empty() {
                return Err("Password must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            concepts: Some(PathBuf::from("editorial-topics.json")),
            config: None,
            base_url: None,
            output: None,
            format: OutputFormat::Html,
            serve: false,
            bind: None,
            password: None,
            timeout: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let mut args = make_args();
        args.base_url = Some("data.cochrane.org/pico-search".to_string());
        assert!(args.validate().is_err());

        args.base_url = Some("https://data.cochrane.org/pico-search".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_bind() {
        let mut args = make_args();
        args.bind = Some("localhost".to_string());
        assert!(args.validate().is_err());

        args.bind = Some("0.0.0.0:8501".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut args = make_args();
        args.password = Some("hunter2".to_string());
        let printed = format!("{:?}", args);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "pico-coverage",
            "--serve",
            "--bind",
            "127.0.0.1:9000",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(args.serve);
        assert_eq!(args.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_serve_conflicts_with_dry_run() {
        let result = Args::try_parse_from(["pico-coverage", "--serve", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
