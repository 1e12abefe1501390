//! Rule-based compound polarity scoring in the style of VADER.
//!
//! Each token's valence comes from the [`Lexicon`] and is then adjusted by the
//! words around it:
//!
//! - boosters and dampeners in the three preceding positions ("very",
//!   "slightly", …), damped by distance
//! - negations in the three preceding positions ("not", "never", any `n't`)
//! - ALL-CAPS emphasis when the text mixes capitalised and normal tokens
//! - "no" and "least" as negators, "never so" / "without doubt" idioms
//! - a contrastive "but", which halves what precedes it and boosts what
//!   follows
//!
//! Token valences are summed, amplified by trailing `!`/`?` emphasis and
//! squashed into [-1, 1] with `x / sqrt(x² + 15)`.

use super::lexicon::Lexicon;
use serde::Serialize;

/// Empirically derived increment for boosting words.
const B_INCR: f64 = 0.293;
/// Empirically derived decrement for dampening words.
const B_DECR: f64 = -0.293;
/// Increment for an ALL-CAPS word when the rest of the text is not shouting.
const C_INCR: f64 = 0.733;
/// Scale applied to a negated valence.
const N_SCALAR: f64 = -0.74;
/// Normalization constant approximating the max expected sum.
const NORMALIZE_ALPHA: f64 = 15.0;

const NEGATE: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent",
    "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't",
    "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't",
    "shan't", "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't",
    "wouldn't", "rarely", "seldom", "despite",
];

/// Intensity shift contributed by a booster or dampener (single words and
/// the bigrams checked by the idiom pass).
fn booster(word: &str) -> Option<f64> {
    match word {
        "absolutely" | "amazingly" | "awfully" | "completely" | "considerable"
        | "considerably" | "decidedly" | "deeply" | "effing" | "enormous" | "enormously"
        | "entirely" | "especially" | "exceptional" | "exceptionally" | "extreme"
        | "extremely" | "fabulously" | "flipping" | "flippin" | "frackin" | "fracking"
        | "fricking" | "frickin" | "frigging" | "friggin" | "fully" | "fuckin" | "fucking"
        | "fuggin" | "fugging" | "greatly" | "hella" | "highly" | "hugely" | "incredible"
        | "incredibly" | "intensely" | "major" | "majorly" | "more" | "most" | "particularly"
        | "purely" | "quite" | "really" | "remarkably" | "so" | "substantially"
        | "thoroughly" | "total" | "totally" | "tremendous" | "tremendously" | "uber"
        | "unbelievably" | "unusually" | "utter" | "utterly" | "very" => Some(B_INCR),
        "almost" | "barely" | "hardly" | "just enough" | "kind of" | "kinda" | "kindof"
        | "kind-of" | "less" | "little" | "marginal" | "marginally" | "occasional"
        | "occasionally" | "partly" | "scarce" | "scarcely" | "slight" | "slightly"
        | "somewhat" | "sort of" | "sorta" | "sortof" | "sort-of" => Some(B_DECR),
        _ => None,
    }
}

/// Multi-word expressions whose valence overrides the word-level score.
fn special_case(sequence: &str) -> Option<f64> {
    match sequence {
        "the shit" | "the bomb" => Some(3.0),
        "bad ass" | "badass" => Some(1.5),
        "bus stop" => Some(0.0),
        "yeah right" => Some(-2.0),
        "kiss of death" => Some(-1.5),
        "to die for" => Some(3.0),
        "beating heart" => Some(3.1),
        "broken heart" => Some(-2.9),
        _ => None,
    }
}

/// Sentiment intensity breakdown for one piece of text.
///
/// `neg`, `neu` and `pos` are proportions rounded to three decimals;
/// `compound` is the normalized sum rounded to four decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Lexicon-backed scorer. Immutable once built; share it by reference.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Score `text`, returning the proportions and the compound score.
    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let senti = SentiText::new(text);
        let lower = &senti.lower;
        let mut sentiments = Vec::with_capacity(lower.len());

        for (i, item) in lower.iter().enumerate() {
            // modifiers carry no sentiment of their own
            if booster(item).is_some() {
                sentiments.push(0.0);
                continue;
            }
            if item == "kind" && lower.get(i + 1).is_some_and(|next| next == "of") {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.sentiment_valence(&senti, i));
        }

        but_check(lower, &mut sentiments);
        score_valence(&sentiments, text)
    }

    /// Convenience accessor for just the compound score.
    pub fn compound(&self, text: &str) -> f64 {
        self.polarity_scores(text).compound
    }

    fn sentiment_valence(&self, senti: &SentiText, i: usize) -> f64 {
        let lower = &senti.lower;
        let item = &lower[i];
        let Some(base) = self.lexicon.get(item) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" directly before another lexicon word acts as a negator, not a sentiment
        if item == "no" && lower.get(i + 1).is_some_and(|next| self.lexicon.contains(next)) {
            valence = 0.0;
        }
        if (i > 0 && lower[i - 1] == "no")
            || (i > 1 && lower[i - 2] == "no")
            || (i > 2 && lower[i - 3] == "no" && matches!(lower[i - 1].as_str(), "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        if is_upper(&senti.tokens[i]) && senti.is_cap_diff {
            if valence > 0.0 {
                valence += C_INCR;
            } else {
                valence -= C_INCR;
            }
        }

        for start_i in 0..3 {
            if i <= start_i {
                break;
            }
            let prev = i - (start_i + 1);
            if self.lexicon.contains(&lower[prev]) {
                continue;
            }

            let mut s = scalar_inc_dec(&senti.tokens[prev], &lower[prev], valence, senti.is_cap_diff);
            if start_i == 1 && s != 0.0 {
                s *= 0.95;
            }
            if start_i == 2 && s != 0.0 {
                s *= 0.9;
            }
            valence += s;
            valence = negation_check(valence, lower, start_i, i);
            if start_i == 2 {
                valence = special_idioms_check(valence, lower, i);
            }
        }

        self.least_check(valence, lower, i)
    }

    /// "least" flips polarity unless it is part of "at least" / "very least".
    fn least_check(&self, valence: f64, lower: &[String], i: usize) -> f64 {
        if i > 1 && !self.lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
            if lower[i - 2] != "at" && lower[i - 2] != "very" {
                return valence * N_SCALAR;
            }
        } else if i > 0 && !self.lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
            return valence * N_SCALAR;
        }
        valence
    }
}

/// Tokenized view of the input text.
struct SentiText {
    tokens: Vec<String>,
    lower: Vec<String>,
    is_cap_diff: bool,
}

impl SentiText {
    fn new(text: &str) -> Self {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(strip_punc_if_word)
            .map(str::to_string)
            .collect();
        let lower = tokens.iter().map(|t| t.to_lowercase()).collect();
        let is_cap_diff = allcap_differential(&tokens);
        Self {
            tokens,
            lower,
            is_cap_diff,
        }
    }
}

/// Strip surrounding punctuation unless that leaves two characters or fewer,
/// which keeps emoticons like `:)` intact.
fn strip_punc_if_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

/// At least one cased character and no lowercase ones.
fn is_upper(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

/// True when some, but not all, tokens are in ALL CAPS.
fn allcap_differential(tokens: &[String]) -> bool {
    let allcap = tokens.iter().filter(|t| is_upper(t)).count();
    allcap > 0 && allcap < tokens.len()
}

fn negated(word: &str) -> bool {
    NEGATE.contains(&word) || word.contains("n't")
}

fn scalar_inc_dec(word: &str, word_lower: &str, valence: f64, is_cap_diff: bool) -> f64 {
    let Some(mut scalar) = booster(word_lower) else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar *= -1.0;
    }
    if is_upper(word) && is_cap_diff {
        if valence > 0.0 {
            scalar += C_INCR;
        } else {
            scalar -= C_INCR;
        }
    }
    scalar
}

fn negation_check(valence: f64, lower: &[String], start_i: usize, i: usize) -> f64 {
    let at = |back: usize| lower[i - back].as_str();
    match start_i {
        0 => {
            if negated(at(1)) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if at(2) == "never" && matches!(at(1), "so" | "this") {
                return valence * 1.25;
            } else if at(2) == "without" && at(1) == "doubt" {
                return valence;
            } else if negated(at(2)) {
                return valence * N_SCALAR;
            }
        }
        2 => {
            if (at(3) == "never" && matches!(at(2), "so" | "this")) || matches!(at(1), "so" | "this")
            {
                return valence * 1.25;
            } else if at(3) == "without" && (at(2) == "doubt" || at(1) == "doubt") {
                return valence;
            } else if negated(at(3)) {
                return valence * N_SCALAR;
            }
        }
        _ => {}
    }
    valence
}

/// Idiom overrides and bigram boosters around position `i` (requires `i >= 3`).
fn special_idioms_check(mut valence: f64, lower: &[String], i: usize) -> f64 {
    let onezero = format!("{} {}", lower[i - 1], lower[i]);
    let twoonezero = format!("{} {} {}", lower[i - 2], lower[i - 1], lower[i]);
    let twoone = format!("{} {}", lower[i - 2], lower[i - 1]);
    let threetwoone = format!("{} {} {}", lower[i - 3], lower[i - 2], lower[i - 1]);
    let threetwo = format!("{} {}", lower[i - 3], lower[i - 2]);

    for seq in [&onezero, &twoonezero, &twoone, &threetwoone, &threetwo] {
        if let Some(v) = special_case(seq) {
            valence = v;
            break;
        }
    }

    if i + 1 < lower.len() {
        let zeroone = format!("{} {}", lower[i], lower[i + 1]);
        if let Some(v) = special_case(&zeroone) {
            valence = v;
        }
    }
    if i + 2 < lower.len() {
        let zeroonetwo = format!("{} {} {}", lower[i], lower[i + 1], lower[i + 2]);
        if let Some(v) = special_case(&zeroonetwo) {
            valence = v;
        }
    }

    for n_gram in [&threetwoone, &threetwo, &twoone] {
        if let Some(b) = booster(n_gram) {
            valence += b;
        }
    }
    valence
}

/// Sentiment before the first "but" is halved, sentiment after it boosted by half.
fn but_check(lower: &[String], sentiments: &mut [f64]) {
    let Some(bi) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (si, sentiment) in sentiments.iter_mut().enumerate() {
        if si < bi {
            *sentiment *= 0.5;
        } else if si > bi {
            *sentiment *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep_count = text.matches('!').count().min(4);
    let ep_amplifier = ep_count as f64 * 0.292;

    let qm_count = text.matches('?').count();
    let qm_amplifier = match qm_count {
        0 | 1 => 0.0,
        2 | 3 => qm_count as f64 * 0.18,
        _ => 0.96,
    };
    ep_amplifier + qm_amplifier
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Round to `places` decimals from the exact binary value, ties to even.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

fn score_valence(sentiments: &[f64], text: &str) -> PolarityScores {
    if sentiments.is_empty() {
        return PolarityScores::default();
    }

    let punct = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += punct;
    } else if sum < 0.0 {
        sum -= punct;
    }
    let compound = normalize(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0usize;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1;
        }
    }

    if pos_sum > neg_sum.abs() {
        pos_sum += punct;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct;
    }

    let total = pos_sum + neg_sum.abs() + neu_count as f64;
    PolarityScores {
        neg: round_to((neg_sum / total).abs(), 3),
        neu: round_to(neu_count as f64 / total, 3),
        pos: round_to((pos_sum / total).abs(), 3),
        compound: round_to(compound, 4),
    }
}
