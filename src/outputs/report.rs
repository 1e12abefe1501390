//! Terminal rendering of analysis results.
//!
//! The report lists the upstream result count, how many articles were
//! analyzed, the per-label counts and the overall verdict, followed by a
//! random sample of scored articles. Labels are colored: positive in green,
//! negative in red, neutral left plain.

use crate::models::{BatchResult, ScoredArticle, SentimentLabel};
use crate::utils::truncate_for_display;
use colored::{ColoredString, Colorize};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write;

/// Descriptions longer than this are cut in the sample listing.
const DESCRIPTION_WIDTH: usize = 160;

/// Color a label for terminal output.
pub fn colorize_label(label: SentimentLabel) -> ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Negative => label.as_str().red(),
        SentimentLabel::Neutral => label.as_str().normal(),
    }
}

/// Pick up to `n` distinct articles at random.
pub fn sample_articles<'a, R>(articles: &'a [ScoredArticle], n: usize, rng: &mut R) -> Vec<&'a ScoredArticle>
where
    R: Rng + ?Sized,
{
    articles.choose_multiple(rng, n).collect()
}

/// Render the counts block of a result.
pub fn render_summary(query: &str, result: &BatchResult) -> String {
    let mut out = String::new();
    writeln!(out, "Analysis Results for \"{query}\":").unwrap();
    writeln!(out, "Number of Results: {}", result.total_results).unwrap();
    writeln!(out, "Analyzed Results: {}", result.analyzed_count()).unwrap();
    writeln!(out, "Number of Positive Results: {}", result.positive_count).unwrap();
    writeln!(out, "Number of Negative Results: {}", result.negative_count).unwrap();
    writeln!(out, "Number of Neutral Results: {}", result.neutral_count()).unwrap();
    writeln!(out, "Overall Sentiment: {}", colorize_label(result.overall_sentiment)).unwrap();
    out
}

/// Render the sampled articles, one block per article.
pub fn render_sample(sample: &[&ScoredArticle]) -> String {
    let mut out = String::new();
    writeln!(out, "{} Randomized Results:", sample.len()).unwrap();
    for article in sample {
        writeln!(
            out,
            "\n[{}] {}",
            colorize_label(article.sentiment),
            article.title.as_deref().unwrap_or("(untitled)").bold()
        )
        .unwrap();
        writeln!(out, "    {}", truncate_for_display(&article.description, DESCRIPTION_WIDTH)).unwrap();
    }
    out
}

/// Full terminal report: counts, then a random sample of `sample_size` articles.
pub fn render_report<R>(query: &str, result: &BatchResult, sample_size: usize, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let sample = sample_articles(&result.scored_articles, sample_size, rng);
    let mut out = render_summary(query, result);
    if !sample.is_empty() {
        out.push('\n');
        out.push_str(&render_sample(&sample));
    }
    out
}
