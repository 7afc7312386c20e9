//! Text normalization, tokenization and part-of-speech tagging.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Entity, Preprocessed};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid url regex"));

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)/?[ru]/\w+").expect("valid mention regex"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#\d+|[a-z]+);").expect("valid html entity regex"));

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+(?:'[a-z]+)?").expect("valid token regex"));

/// Words dropped before topic modeling and relevance scoring.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "don't", "down", "during", "each",
    "even", "few", "for", "from", "further", "get", "got", "had", "has", "have", "having", "he",
    "her", "here", "hers", "him", "his", "how", "i", "i'm", "if", "in", "into", "is", "it",
    "it's", "its", "just", "like", "me", "more", "most", "my", "no", "nor", "not", "now", "of",
    "off", "on", "once", "one", "only", "or", "other", "our", "out", "over", "own", "really",
    "same", "she", "should", "so", "some", "such", "than", "that", "that's", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "you", "you're", "your", "yours",
];

/// Strip URLs, subreddit/user mentions and HTML entities, then lowercase.
#[must_use]
pub fn normalize(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = MENTION_RE.replace_all(&text, " ");
    let text = ENTITY_RE.replace_all(&text, " ");
    text.to_lowercase()
}

/// Split text into normalized word tokens. Empty text yields no tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    TOKEN_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokens that carry topical content: stop words and tokens under three characters removed.
pub(crate) fn content_terms(tokens: &[String]) -> impl Iterator<Item = &str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|t| t.len() >= 3 && !STOP_WORDS.contains(t))
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "another", "either", "neither",
];
const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself",
    "yourself", "itself", "themselves", "someone", "something", "anyone", "anything", "everyone",
    "everything", "nobody", "nothing",
];
/// Pronoun contractions; `it's` is a pronoun plus verb, not a possessive.
const CONTRACTED_PRONOUNS: &[&str] = &[
    "it's", "that's", "he's", "she's", "there's", "here's", "what's", "who's", "i'm", "you're",
    "we're", "they're", "i've", "you've", "we've", "they've", "i'll", "you'll", "he'll",
    "she'll", "it'll", "we'll", "they'll", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd",
];
const POSSESSIVES: &[&str] = &["my", "your", "his", "her", "its", "our", "their"];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "from", "up", "down", "of", "off", "over",
    "under", "without", "within", "like", "than", "via", "per",
];
const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet", "so"];
const MODALS: &[&str] = &[
    "can", "could", "may", "might", "must", "shall", "should", "will", "would",
];
const BE_FORMS: &[&str] = &["is", "am", "are", "was", "were", "be", "been", "being"];
const WH_WORDS: &[&str] = &["what", "which", "who", "whom", "whose", "why", "how", "where", "when"];
const ADVERBS: &[&str] = &[
    "not", "very", "too", "also", "just", "really", "never", "always", "often", "here", "there",
    "now", "then", "still", "already", "again", "even",
];

/// Tag one lowercase token with a Penn Treebank part-of-speech tag.
///
/// Closed-class words come from fixed lists; open-class words fall back to
/// suffix rules and finally `NN`.
#[must_use]
pub fn tag_token(token: &str) -> &'static str {
    let closed: &[(&[&str], &'static str)] = &[
        (DETERMINERS, "DT"),
        (POSSESSIVES, "PRP$"),
        (PRONOUNS, "PRP"),
        (CONTRACTED_PRONOUNS, "PRP"),
        (PREPOSITIONS, "IN"),
        (CONJUNCTIONS, "CC"),
        (MODALS, "MD"),
        (BE_FORMS, "VB"),
        (WH_WORDS, "WP"),
        (ADVERBS, "RB"),
    ];
    for (words, tag) in closed {
        if words.contains(&token) {
            return *tag;
        }
    }

    if token == "to" {
        "TO"
    } else if token.chars().all(|c| c.is_ascii_digit()) {
        "CD"
    } else if token.ends_with("n't") {
        "RB"
    } else if token.len() > 4 && token.ends_with("ly") {
        "RB"
    } else if token.len() > 4 && token.ends_with("ing") {
        "VBG"
    } else if token.len() > 3 && token.ends_with("ed") {
        "VBD"
    } else if token.ends_with("'s") {
        "POS"
    } else if token.len() > 5
        && (token.ends_with("ous") || token.ends_with("ful") || token.ends_with("able"))
    {
        "JJ"
    } else if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        "NNS"
    } else {
        "NN"
    }
}

/// Attach token, tag and cleaned-text columns to every record.
///
/// Row count and order are preserved; records with empty text get empty
/// sequences.
#[must_use]
pub fn preprocess<R: Entity>(records: &[R]) -> Vec<Preprocessed<R>> {
    records
        .iter()
        .map(|record| {
            let tokens = tokenize(record.text());
            let tags = tokens.iter().map(|t| tag_token(t)).collect();
            let token_string = tokens.join(" ");
            Preprocessed {
                record: record.clone(),
                tokens,
                tags,
                token_string,
            }
        })
        .collect()
}
