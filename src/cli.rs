//! Command-line interface definitions for News Sentiment.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! The API key can be provided via flag or environment variable.

use crate::sentiment::aggregator::OverallStrategy;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Sentiment application.
///
/// # Examples
///
/// ```sh
/// # Fetch and save the list of allowed sources
/// news_sentiment sources
///
/// # Analyze recent coverage of a topic
/// news_sentiment analyze "electric vehicles" --from 2025-05-01 --sources bbc-news,reuters
///
/// # Write the full result as JSON too
/// news_sentiment analyze "interest rates" -j ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// News API key
    #[arg(long, env = "NEWS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// File holding the allowed source ids (overrides the config file)
    #[arg(long, global = true)]
    pub sources_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the source catalogue from the API and save it locally
    Sources,
    /// Fetch articles for a query and summarize their sentiment
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Free-text news query
    pub query: String,

    /// Earliest publication date (YYYY-MM-DD), at most 29 days ago
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest publication date (YYYY-MM-DD), no later than today
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Comma-separated source ids to restrict the search to
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Number of random articles shown in the report
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// How the overall sentiment is derived
    #[arg(long, value_enum)]
    pub strategy: Option<OverallStrategy>,

    /// Results per page requested from the API (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Output directory for a JSON copy of the result
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}
