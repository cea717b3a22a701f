//! PICO Coverage - concept coverage dashboard for the Cochrane pico-search API
//!
//! Fetches the number of reviews matching each editorial concept, groups
//! them by PICO category and renders bar charts and a treemap, either as a
//! report file or as a password-gated web dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (config, concept file, network, API response)

mod analysis;
mod cli;
mod concepts;
mod config;
mod error;
mod fetcher;
mod models;
mod query;
mod report;
mod server;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use fetcher::{CoverageClient, FetchConfig};
use indicatif::{ProgressBar, ProgressStyle};
use models::{CoverageReport, ReportMetadata};
use server::gate::PasswordGate;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("PICO Coverage v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .pico-coverage.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the endpoint, facets, concept file and dashboard.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch to dry run, dashboard server or one-shot report.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = CoverageClient::new(FetchConfig::from(&config.api))
        .context("Failed to create search client")?;

    if args.dry_run {
        return handle_dry_run(&config, &client);
    }

    if args.serve {
        return run_server(&args, &config, client).await;
    }

    run_report(&args, &config, &client).await
}

/// Handle --dry-run: classify concepts and print request URLs, no network.
fn handle_dry_run(config: &Config, client: &CoverageClient) -> Result<()> {
    println!("\n🔍 Dry run: building queries (no API calls)...\n");

    let concepts = concepts::load_concepts(Path::new(&config.general.concepts))?;
    let queries = query::build_queries(&concepts)?;

    if concepts.is_empty() {
        println!("   No concepts found in {}.", config.general.concepts);
    }

    for (concept, query) in concepts.iter().zip(&queries) {
        println!("   {} [{}]", concept.label, query.category);
        println!("     {}", client.search_url(&query.fragment)?);
    }

    println!("\n✅ Dry run complete. {} concepts, no API calls were made.", concepts.len());
    Ok(())
}

/// Serve the dashboard.
async fn run_server(args: &Args, config: &Config, client: CoverageClient) -> Result<()> {
    let gate = match (&args.password, &config.server.password_sha256) {
        (Some(secret), _) => PasswordGate::from_secret(secret),
        (None, Some(digest)) => PasswordGate::from_digest(digest),
        (None, None) => {
            warn!("No dashboard password configured; the dashboard is open to anyone who can reach it");
            PasswordGate::open()
        }
    }
    .with_session_limit(config.server.max_sessions);

    let state = server::AppState {
        client,
        concepts_path: config.general.concepts.clone().into(),
        gate,
    };

    println!("🌐 Serving PICO Coverage dashboard on http://{}", config.server.bind);
    server::serve(&config.server.bind, Arc::new(state)).await
}

/// Run the pipeline once and write a report file.
async fn run_report(args: &Args, config: &Config, client: &CoverageClient) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load concepts
    let concept_path = Path::new(&config.general.concepts);
    println!("📥 Loading concepts: {}", concept_path.display());
    let concepts = concepts::load_concepts(concept_path)?;

    // Step 2: Fetch coverage, one concept at a time
    println!("🔬 Fetching coverage from {}", client.endpoint());
    let progress = fetch_progress(concepts.len() as u64, args.quiet);
    let table = analysis::generate_dataset(client, &concepts, &progress).await?;
    if table.is_empty() {
        warn!("Concept list is empty; the report will have no rows");
    }

    // Step 3: Aggregate
    let summary = analysis::summarize(&table);
    let duration = start_time.elapsed().as_secs_f64();

    // Step 4: Render and save
    println!("\n📝 Generating report...");
    let output_path = config.output_path(args.format);
    let output = match args.format {
        OutputFormat::Html => {
            report::render_dashboard(&analysis::partition(&table), Default::default())
        }
        OutputFormat::Markdown | OutputFormat::Json => {
            let coverage_report = CoverageReport {
                metadata: ReportMetadata {
                    generated_at: Utc::now(),
                    endpoint: client.endpoint().to_string(),
                    concept_file: config.general.concepts.clone(),
                    duration_seconds: duration,
                },
                summary: summary.clone(),
                rows: table,
            };
            if args.format == OutputFormat::Json {
                report::generate_json_report(&coverage_report)?
            } else {
                report::generate_markdown_report(&coverage_report)
            }
        }
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path))?;

    // Print summary
    println!("\n📊 Coverage Summary:");
    for totals in &summary.by_category {
        println!(
            "   - {}: {} concepts, {} results",
            totals.category, totals.concepts, totals.coverage
        );
    }
    println!("   Total: {} concepts, {} results", summary.concepts, summary.total_coverage);
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Done! Report saved to: {}", output_path);

    Ok(())
}

/// Progress bar for the fetch loop, hidden in quiet mode.
fn fetch_progress(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("   [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
