//! Lexicon sentiment scorer for forum discussion text.

use crate::adapters::SentimentModel;
use crate::error::AdapterError;

/// Word weights for general discussion sentiment.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("awesome", 0.5),
    ("amazing", 0.5),
    ("helpful", 0.4),
    ("useful", 0.3),
    ("interesting", 0.3),
    ("thanks", 0.3),
    ("thank", 0.3),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("recommend", 0.4),
    ("easy", 0.3),
    ("clear", 0.3),
    ("elegant", 0.4),
    ("fast", 0.2),
    ("fun", 0.4),
    ("happy", 0.4),
    ("nice", 0.3),
    ("correct", 0.2),
    ("agree", 0.2),
    ("works", 0.2),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("wrong", -0.3),
    ("broken", -0.5),
    ("bug", -0.3),
    ("buggy", -0.4),
    ("crash", -0.4),
    ("slow", -0.3),
    ("confusing", -0.4),
    ("useless", -0.5),
    ("stupid", -0.5),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("annoying", -0.4),
    ("disagree", -0.2),
    ("difficult", -0.2),
    ("hard", -0.1),
    ("sad", -0.4),
];

/// Words that flip the polarity of the next lexicon hit, besides any `n't` form.
const NEGATIONS: &[&str] = &["not", "no", "never", "cannot"];

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. A negation word flips the sign of the next
/// matching word. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    let mut negate = false;
    for word in text.split_whitespace() {
        let word = word.replace('\u{2019}', "'");
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic() && c != '\'')
            .to_lowercase();
        if is_negation(&w) {
            negate = true;
            continue;
        }
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += if negate { -weight } else { weight };
                negate = false;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// [`SentimentModel`] backed by [`lexicon_score`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconSentiment;

impl SentimentModel for LexiconSentiment {
    fn score(&self, texts: &[&str]) -> Result<Vec<f32>, AdapterError> {
        Ok(texts.iter().map(|t| lexicon_score(t)).collect())
    }
}
