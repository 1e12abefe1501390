//! Word-valence lexicon used by the rule-based scorer.
//!
//! The on-disk format is the one the VADER project ships: one entry per line,
//! tab separated, `token<TAB>mean_valence[<TAB>std_dev<TAB>raw_ratings]`. Only
//! the first two columns are read. Blank lines and lines starting with `#`
//! are skipped.
//!
//! A general-purpose lexicon of roughly 2,300 common words is embedded in the
//! binary and used unless configuration points at a replacement file, such
//! as the complete upstream `vader_lexicon.txt`.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

const EMBEDDED_LEXICON: &str = include_str!("vader_lexicon.txt");

/// Errors raised while reading a lexicon.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The lexicon file could not be read.
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line did not have a token and a numeric valence.
    #[error("malformed lexicon entry on line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    /// The file parsed but contained no entries.
    #[error("lexicon contains no entries")]
    Empty,
}

/// Case-insensitive token → valence map.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: HashMap<String, f64>,
}

impl Lexicon {
    /// Parse lexicon text in VADER's tab-separated format.
    pub fn parse(text: &str) -> Result<Self, LexiconError> {
        let mut entries = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut cols = line.split('\t');
            let token = cols.next().map(str::trim).unwrap_or_default();
            let valence = cols.next().and_then(|v| v.trim().parse::<f64>().ok());

            match valence {
                Some(v) if !token.is_empty() => {
                    entries.insert(token.to_lowercase(), v);
                }
                _ => {
                    return Err(LexiconError::Malformed {
                        line: idx + 1,
                        content: line.to_string(),
                    });
                }
            }
        }

        if entries.is_empty() {
            return Err(LexiconError::Empty);
        }
        Ok(Self { entries })
    }

    /// Load a lexicon file from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let lexicon = Self::parse(&text)?;
        info!(entries = lexicon.len(), "Loaded sentiment lexicon");
        Ok(lexicon)
    }

    /// The lexicon compiled into the binary.
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_LEXICON).expect("embedded lexicon is well-formed")
    }

    /// Valence for an already-lowercased token.
    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_lexicon_parses() {
        let lexicon = Lexicon::parse(EMBEDDED_LEXICON).unwrap();
        assert!(lexicon.len() > 2000);
        assert_eq!(lexicon.get("wonderful"), Some(2.7));
        assert_eq!(lexicon.get("terrible"), Some(-2.1));
    }

    #[test]
    fn test_label_words_not_all_in_lexicon() {
        let lexicon = Lexicon::embedded();
        assert!(lexicon.contains("positive"));
        assert!(lexicon.contains("negative"));
        assert!(!lexicon.contains("neutral"));
    }

    #[test]
    fn test_parse_full_vader_row_format() {
        let text = "$:\t-1.5\t0.80623\t[-1, -1, -1, -1, -3, -1, -3, -1, -2, -1]\n\
                    Good\t1.9\t0.9434\t[2, 1, 1, 3, 2, 4, 2, 2, 1, 1]\n";
        let lexicon = Lexicon::parse(text).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get("$:"), Some(-1.5));
        // tokens are folded to lowercase on load
        assert_eq!(lexicon.get("good"), Some(1.9));
        assert_eq!(lexicon.get("Good"), None);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# custom words\n\nstonks\t2.0\n\r\n";
        let lexicon = Lexicon::parse(text).unwrap();
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.get("stonks"), Some(2.0));
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = Lexicon::parse("good\t1.9\nbroken line\n").unwrap_err();
        match err {
            LexiconError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Lexicon::parse("\n# nothing\n"), Err(LexiconError::Empty)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rally\t2.2").unwrap();
        writeln!(file, "slump\t-1.8").unwrap();

        let lexicon = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(lexicon.get("rally"), Some(2.2));
        assert_eq!(lexicon.get("slump"), Some(-1.8));
    }

    #[test]
    fn test_from_missing_file() {
        let err = Lexicon::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, LexiconError::Io { .. }));
    }
}
