//! # News Sentiment
//!
//! Fetches news articles for a free-text query from a NewsAPI-compatible
//! search service, classifies each article description as positive, negative
//! or neutral with a lexicon-based scorer, and summarizes the batch.
//!
//! ## Features
//!
//! - Rule-based compound polarity scoring with an embedded lexicon
//!   (replaceable through configuration)
//! - Per-query counts and an overall verdict, with selectable strategy
//! - Local list of allowed source ids, refreshed with the `sources` command
//! - Terminal report with a colored random sample, and optional JSON output
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... news_sentiment sources
//! NEWS_API_KEY=... news_sentiment analyze "electric vehicles" -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: YAML file (optional) overridden by CLI flags
//! 2. **Fetching**: `everything` search through a retrying HTTP client
//! 3. **Aggregation**: classify descriptions, count labels, derive the verdict
//! 4. **Output**: terminal report and JSON file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod models;
mod outputs;
mod sentiment;
mod sources;
mod utils;

use api::{NewsClient, NewsQuery};
use cli::{AnalyzeArgs, Cli, Command};
use config::AppConfig;
use models::Report;
use outputs::{json, report};
use sentiment::aggregator::Aggregator;
use sentiment::default_analyzer;
use sentiment::lexicon::Lexicon;
use sentiment::vader::SentimentAnalyzer;
use sources::SourcesError;
use utils::{ensure_writable_dir, validate_date_window};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment starting up");

    let cli = Cli::parse();
    debug!(command = ?cli.command, config = ?cli.config, "Parsed CLI arguments");

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if let Some(path) = cli.sources_file {
        config.sources_file = path;
    }

    let outcome = match cli.command {
        Command::Sources => refresh_sources(&config).await,
        Command::Analyze(args) => analyze(&config, args).await,
    };
    if let Err(e) = &outcome {
        error!(error = %e, "Run failed");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    outcome
}

fn client(config: &AppConfig) -> Result<NewsClient<api::RetryFetch<api::HttpFetcher>>, Box<dyn Error>> {
    let Some(api_key) = config.api_key.clone() else {
        return Err("no API key: pass --api-key or set NEWS_API_KEY".into());
    };
    Ok(NewsClient::http(
        &config.base_url,
        api_key,
        config.timeout(),
        config.max_retries,
    )?)
}

/// Fetch the source catalogue and persist the ids locally.
#[instrument(level = "info", skip_all, fields(sources_file = %config.sources_file))]
async fn refresh_sources(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let client = client(config)?;
    let ids = client.source_ids().await?;
    sources::save_sources(&config.sources_file, &ids).await?;
    println!("Saved {} sources to {}", ids.len(), config.sources_file);
    Ok(())
}

/// Narrow the requested sources to the saved list, when there is one.
async fn resolve_sources(sources_file: &str, requested: Vec<String>) -> Result<Vec<String>, Box<dyn Error>> {
    if requested.is_empty() {
        return Ok(requested);
    }
    match sources::load_sources(sources_file).await {
        Ok(allowed) => {
            let (known, _unknown) = sources::partition_requested(&allowed, &requested);
            if known.is_empty() {
                return Err("none of the requested sources are in the saved source list".into());
            }
            Ok(known)
        }
        Err(SourcesError::NotFound(path)) => {
            warn!(%path, "No saved source list; passing requested sources through unchecked");
            Ok(requested)
        }
        Err(e) => Err(e.into()),
    }
}

/// Search, score and report on one query.
#[instrument(level = "info", skip_all, fields(query = %args.query))]
async fn analyze(config: &AppConfig, args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let today = Local::now().date_naive();
    validate_date_window(args.from, args.to, today)?;

    // Fail early rather than after the API round trip
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let client = client(config)?;
    let sources = resolve_sources(&config.sources_file, args.sources).await?;

    let query = NewsQuery {
        query: args.query.clone(),
        from: args.from,
        to: args.to,
        sources: sources.clone(),
        page_size: args.page_size.or(config.page_size),
    };
    let response = client.everything(&query).await?;

    let custom_analyzer;
    let analyzer: &SentimentAnalyzer = match &config.lexicon_path {
        Some(path) => {
            custom_analyzer = SentimentAnalyzer::new(Lexicon::from_file(path)?);
            &custom_analyzer
        }
        None => default_analyzer(),
    };

    let strategy = args.strategy.unwrap_or(config.overall_strategy);
    let result = Aggregator::new(analyzer)
        .with_strategy(strategy)
        .aggregate(&response.articles, response.total_results);
    info!(
        analyzed = result.analyzed_count(),
        positive = result.positive_count,
        negative = result.negative_count,
        overall = %result.overall_sentiment,
        ?strategy,
        "Aggregated sentiment"
    );

    let sample_size = args.sample_size.unwrap_or(config.sample_size);
    print!(
        "{}",
        report::render_report(&args.query, &result, sample_size, &mut rand::rng())
    );

    if let Some(dir) = &args.json_output_dir {
        let now = Local::now();
        let report = Report {
            query: args.query,
            local_date: now.date_naive().to_string(),
            local_time: now.time().format("%H:%M:%S").to_string(),
            from: args.from.map(|d| d.to_string()),
            to: args.to.map(|d| d.to_string()),
            sources,
            result,
        };
        let path = json::write_report(&report, dir).await?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}
