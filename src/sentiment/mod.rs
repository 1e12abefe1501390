//! Sentiment classification and batch aggregation.
//!
//! # Submodules
//!
//! - [`lexicon`]: Word-valence lexicon loading (embedded or from a file)
//! - [`vader`]: Rule-based compound polarity scorer
//! - [`aggregator`]: Per-query classification, counting, and overall verdict
//!
//! The embedded-lexicon analyzer is built on first use and shared for the
//! rest of the process.

pub mod aggregator;
pub mod lexicon;
pub mod vader;

use crate::models::SentimentLabel;
use lexicon::Lexicon;
use once_cell::sync::Lazy;
use vader::SentimentAnalyzer;

static DEFAULT_ANALYZER: Lazy<SentimentAnalyzer> =
    Lazy::new(|| SentimentAnalyzer::new(Lexicon::embedded()));

/// The process-wide analyzer backed by the embedded lexicon.
pub fn default_analyzer() -> &'static SentimentAnalyzer {
    &DEFAULT_ANALYZER
}

impl SentimentAnalyzer {
    /// Classify `text` by its compound score.
    pub fn classify(&self, text: &str) -> SentimentLabel {
        SentimentLabel::from_compound(self.compound(text))
    }
}

/// Classify `text` with the embedded lexicon.
pub fn classify(text: &str) -> SentimentLabel {
    default_analyzer().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_empty_is_neutral() {
        assert_eq!(classify(""), SentimentLabel::Neutral);
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("This is wonderful and amazing news!"), SentimentLabel::Positive);
        assert_eq!(classify("This is terrible and awful."), SentimentLabel::Negative);
        assert_eq!(classify("The meeting is on Tuesday."), SentimentLabel::Neutral);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let text = "Shares slump after a disappointing quarter";
        let first = classify(text);
        for _ in 0..10 {
            assert_eq!(classify(text), first);
        }
    }

    #[test]
    fn test_custom_lexicon_changes_verdict() {
        let lexicon = Lexicon::parse("stonks\t2.5\n").unwrap();
        let analyzer = SentimentAnalyzer::new(lexicon);
        assert_eq!(analyzer.classify("stonks"), SentimentLabel::Positive);
        assert_eq!(classify("stonks"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_default_analyzer_is_shared() {
        assert!(std::ptr::eq(default_analyzer(), default_analyzer()));
    }
}
