//! Batch aggregation of per-article sentiment.
//!
//! Articles without a description are dropped, the rest are classified in
//! input order, and positive/negative labels are counted. The overall verdict
//! defaults to classifying the space-joined label names themselves
//! ("Positive Negative Neutral …"), which is what existing reports were built
//! on. [`OverallStrategy`] offers numeric alternatives.

use crate::models::{Article, BatchResult, ScoredArticle, SentimentLabel};
use crate::sentiment::vader::SentimentAnalyzer;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// How the batch-level verdict is derived from the per-article labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverallStrategy {
    /// Classify the label names joined by spaces.
    #[default]
    LabelWords,
    /// Most frequent label; ties resolve to Neutral.
    Majority,
    /// Mean compound score pushed through the label thresholds.
    Mean,
}

/// Classifies a batch of articles with a shared analyzer.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    analyzer: &'a SentimentAnalyzer,
    strategy: OverallStrategy,
}

impl<'a> Aggregator<'a> {
    pub fn new(analyzer: &'a SentimentAnalyzer) -> Self {
        Self {
            analyzer,
            strategy: OverallStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: OverallStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Score `articles` and summarize them.
    ///
    /// `total_results` is the count reported by the upstream search and is
    /// passed through untouched.
    #[instrument(level = "info", skip_all, fields(articles = articles.len(), strategy = ?self.strategy))]
    pub fn aggregate(&self, articles: &[Article], total_results: u64) -> BatchResult {
        let mut positive_count = 0;
        let mut negative_count = 0;

        let scored_articles: Vec<ScoredArticle> = articles
            .iter()
            .filter_map(|article| {
                let description = article.description.as_ref()?;
                let compound = self.analyzer.compound(description);
                let sentiment = SentimentLabel::from_compound(compound);
                match sentiment {
                    SentimentLabel::Positive => positive_count += 1,
                    SentimentLabel::Negative => negative_count += 1,
                    SentimentLabel::Neutral => {}
                }
                Some(ScoredArticle {
                    title: article.title.clone(),
                    description: description.clone(),
                    sentiment,
                    compound,
                })
            })
            .collect();

        let overall_sentiment = self.overall(&scored_articles, positive_count, negative_count);
        debug!(
            scored = scored_articles.len(),
            dropped = articles.len() - scored_articles.len(),
            positive_count,
            negative_count,
            %overall_sentiment,
            "Aggregated batch"
        );

        BatchResult {
            positive_count,
            negative_count,
            scored_articles,
            overall_sentiment,
            total_results,
        }
    }

    fn overall(
        &self,
        scored: &[ScoredArticle],
        positive_count: usize,
        negative_count: usize,
    ) -> SentimentLabel {
        match self.strategy {
            OverallStrategy::LabelWords => {
                let words = scored.iter().map(|a| a.sentiment.as_str()).join(" ");
                self.analyzer.classify(&words)
            }
            OverallStrategy::Majority => {
                let neutral_count = scored.len() - positive_count - negative_count;
                if positive_count > negative_count && positive_count > neutral_count {
                    SentimentLabel::Positive
                } else if negative_count > positive_count && negative_count > neutral_count {
                    SentimentLabel::Negative
                } else {
                    SentimentLabel::Neutral
                }
            }
            OverallStrategy::Mean => {
                if scored.is_empty() {
                    return SentimentLabel::Neutral;
                }
                let mean = scored.iter().map(|a| a.compound).sum::<f64>() / scored.len() as f64;
                SentimentLabel::from_compound(mean)
            }
        }
    }
}
