//! Bag-of-words cosine relevance between a post and a comment.

use std::collections::BTreeMap;

use crate::adapters::RelevanceModel;
use crate::error::AdapterError;
use crate::preprocess::{content_terms, tokenize};

fn term_vector(text: &str) -> BTreeMap<String, f64> {
    let tokens = tokenize(text);
    let mut counts = BTreeMap::new();
    for term in content_terms(&tokens) {
        *counts.entry(term.to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of the two texts' content-term frequencies, in `[0.0, 1.0]`.
///
/// Returns `0.0` when either side has no content terms.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cosine_relevance(post_text: &str, comment_text: &str) -> f32 {
    let post = term_vector(post_text);
    let comment = term_vector(comment_text);
    if post.is_empty() || comment.is_empty() {
        return 0.0;
    }

    let dot: f64 = comment
        .iter()
        .filter_map(|(term, c)| post.get(term).map(|p| p * c))
        .sum();
    let norm = |v: &BTreeMap<String, f64>| v.values().map(|x| x * x).sum::<f64>().sqrt();
    let similarity = dot / (norm(&post) * norm(&comment));

    similarity.clamp(0.0, 1.0) as f32
}

/// [`RelevanceModel`] backed by [`cosine_relevance`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CosineRelevance;

impl RelevanceModel for CosineRelevance {
    fn score_pair(&self, post_text: &str, comment_text: &str) -> Result<f32, AdapterError> {
        Ok(cosine_relevance(post_text, comment_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_one() {
        let score = cosine_relevance("borrow checker lifetimes", "Borrow checker lifetimes!");
        assert!((score - 1.0).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn disjoint_texts_score_zero() {
        assert_eq!(cosine_relevance("borrow checker", "gardening tomatoes"), 0.0);
    }

    #[test]
    fn partial_overlap_is_between_bounds() {
        let score = cosine_relevance(
            "Why does the borrow checker reject this closure?",
            "The borrow checker cannot prove the closure outlives the loop",
        );
        assert!(score > 0.0 && score < 1.0, "got {score}");
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(cosine_relevance("", "anything at all"), 0.0);
        assert_eq!(cosine_relevance("some post", "the a an"), 0.0);
    }
}
