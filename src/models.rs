//! Data models for fetched articles and their sentiment-scored representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A raw article as returned by the news search API
//! - [`SentimentLabel`]: The three-way sentiment classification
//! - [`ScoredArticle`]: An article paired with its sentiment label
//! - [`BatchResult`]: Summary counts and labeled records for one query
//! - [`Report`]: A `BatchResult` plus the parameters of the run, for JSON output
//! - Wire types: [`EverythingResponse`], [`SourcesResponse`], [`ApiErrorBody`]
//!
//! The wire types use the upstream camelCase field names through serde renames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw news article as returned by the search API.
///
/// Only `title` and `description` take part in sentiment scoring; the other
/// fields are kept so the JSON report can point back at the story.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Article {
    /// The article headline, if the upstream had one.
    #[serde(default)]
    pub title: Option<String>,
    /// The short description snippet that gets classified.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the full article.
    #[serde(default)]
    pub url: Option<String>,
    /// Publication timestamp as reported upstream.
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    /// The outlet that published the article.
    #[serde(default)]
    pub source: Option<ArticleSource>,
}

impl Article {
    /// Build an article from just a title and a description.
    pub fn new(title: Option<&str>, description: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            ..Self::default()
        }
    }
}

/// The outlet reference embedded in each article.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Three-way sentiment classification of a piece of text.
///
/// The display names (`Positive`, `Negative`, `Neutral`) are significant: the
/// overall sentiment of a batch is computed by classifying the label names
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Compound scores at or above this value are positive.
    pub const POSITIVE_THRESHOLD: f64 = 0.05;
    /// Compound scores at or below this value are negative.
    pub const NEGATIVE_THRESHOLD: f64 = -0.05;

    /// Map a compound polarity score onto a label.
    ///
    /// Both thresholds are inclusive; anything strictly between them is
    /// neutral.
    pub fn from_compound(score: f64) -> Self {
        if score >= Self::POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= Self::NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article that made it through scoring.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredArticle {
    pub title: Option<String>,
    pub description: String,
    pub sentiment: SentimentLabel,
    /// The compound score the label was derived from.
    pub compound: f64,
}

/// Summary of one query's worth of articles.
///
/// `scored_articles` keeps the order the articles arrived in. Articles without
/// a description are absent from it, so `total_results` (the upstream count)
/// may be larger than the number of scored articles.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BatchResult {
    pub positive_count: usize,
    pub negative_count: usize,
    pub scored_articles: Vec<ScoredArticle>,
    pub overall_sentiment: SentimentLabel,
    pub total_results: u64,
}

impl BatchResult {
    /// Number of articles that were actually classified.
    pub fn analyzed_count(&self) -> usize {
        self.scored_articles.len()
    }

    pub fn neutral_count(&self) -> usize {
        self.analyzed_count() - self.positive_count - self.negative_count
    }
}

/// One analysis run as written to the JSON report.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    /// The search query the articles were fetched for.
    pub query: String,
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the run.
    pub local_time: String,
    /// Requested date range, when one was given.
    pub from: Option<String>,
    pub to: Option<String>,
    /// Source ids the search was restricted to.
    pub sources: Vec<String>,
    pub result: BatchResult,
}

/// Response body of the `everything` search endpoint.
#[derive(Debug, Deserialize)]
pub struct EverythingResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "totalResults")]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Response body of the `sources` catalogue endpoint.
#[derive(Debug, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// One outlet in the source catalogue. Only the id is used downstream.
#[derive(Debug, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Error payload returned by the API alongside a non-success status.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds_are_inclusive() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.0499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.0499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(1.0), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-1.0), SentimentLabel::Negative);
    }

    #[test]
    fn test_label_display_names() {
        assert_eq!(SentimentLabel::Positive.to_string(), "Positive");
        assert_eq!(SentimentLabel::Negative.to_string(), "Negative");
        assert_eq!(SentimentLabel::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_everything_response_deserialization() {
        let json = r#"{
            "status": "ok",
            "totalResults": 1234,
            "articles": [
                {
                    "source": {"id": "bbc-news", "name": "BBC News"},
                    "title": "Headline",
                    "description": "Something happened.",
                    "url": "https://example.com/a",
                    "publishedAt": "2025-05-06T10:00:00Z"
                },
                {
                    "source": {"id": null, "name": "Blog"},
                    "title": "No description here",
                    "description": null
                }
            ]
        }"#;

        let resp: EverythingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.total_results, 1234);
        assert_eq!(resp.articles.len(), 2);
        assert_eq!(resp.articles[0].description.as_deref(), Some("Something happened."));
        assert_eq!(
            resp.articles[0].source.as_ref().and_then(|s| s.id.as_deref()),
            Some("bbc-news")
        );
        assert!(resp.articles[1].description.is_none());
    }

    #[test]
    fn test_sources_response_deserialization() {
        let json = r#"{"status":"ok","sources":[{"id":"abc-news","name":"ABC News"},{"id":"reuters"}]}"#;
        let resp: SourcesResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = resp.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["abc-news", "reuters"]);
    }

    #[test]
    fn test_batch_result_counts() {
        let scored = |label| ScoredArticle {
            title: None,
            description: "x".to_string(),
            sentiment: label,
            compound: 0.0,
        };
        let result = BatchResult {
            positive_count: 1,
            negative_count: 1,
            scored_articles: vec![
                scored(SentimentLabel::Positive),
                scored(SentimentLabel::Negative),
                scored(SentimentLabel::Neutral),
                scored(SentimentLabel::Neutral),
            ],
            overall_sentiment: SentimentLabel::Neutral,
            total_results: 10,
        };
        assert_eq!(result.analyzed_count(), 4);
        assert_eq!(result.neutral_count(), 2);
    }

    #[test]
    fn test_batch_result_serialization() {
        let result = BatchResult {
            positive_count: 0,
            negative_count: 0,
            scored_articles: vec![],
            overall_sentiment: SentimentLabel::Neutral,
            total_results: 0,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"overall_sentiment\":\"Neutral\""));
        assert!(json.contains("\"total_results\":0"));
    }
}
