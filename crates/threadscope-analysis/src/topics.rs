//! Keyword-seeded topic model.
//!
//! Each document is treated as a bag of content terms. Frequent terms become
//! topic seeds, documents join the seed they weight highest under TF-IDF, and
//! clusters that end up too small are folded into the outlier topic. Topic ids
//! are numbered by cluster size, largest first, and named after their most
//! characteristic terms (`0_borrow_checker_lifetimes_compiler`).

use std::collections::{BTreeMap, HashSet};

use threadscope_core::TopicModelConfig;

use crate::adapters::{TopicAssignment, TopicModel, OUTLIER_TOPIC, OUTLIER_TOPIC_NAME};
use crate::error::AdapterError;
use crate::preprocess::content_terms;

/// Terms used to build each topic name.
const NAME_TERMS: usize = 4;

/// A candidate seed is skipped when at least this share of its documents
/// already contain a chosen seed.
const SEED_OVERLAP_LIMIT: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct KeywordTopicModel {
    config: TopicModelConfig,
}

impl KeywordTopicModel {
    /// A `min_topic_size` of 0 is treated as 1; a topic always has a member.
    #[must_use]
    pub fn new(config: TopicModelConfig) -> Self {
        Self {
            config: TopicModelConfig {
                min_topic_size: config.min_topic_size.max(1),
                ..config
            },
        }
    }
}

impl Default for KeywordTopicModel {
    fn default() -> Self {
        Self::new(TopicModelConfig::default())
    }
}

type TermCounts<'a> = BTreeMap<&'a str, usize>;

fn term_counts(doc: &[String]) -> TermCounts<'_> {
    let mut counts = BTreeMap::new();
    for term in content_terms(doc) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Smoothed inverse document frequency, always positive.
#[allow(clippy::cast_precision_loss)]
fn idf(doc_count: usize, df: usize) -> f64 {
    ((1.0 + doc_count as f64) / (1.0 + df as f64)).ln() + 1.0
}

impl KeywordTopicModel {
    /// Pick up to `max_topics` seed terms, most widespread first.
    fn select_seeds<'a>(
        &self,
        docs: &[TermCounts<'a>],
        df: &BTreeMap<&'a str, usize>,
    ) -> Vec<&'a str> {
        let mut candidates: Vec<(&str, usize)> = df
            .iter()
            .filter(|(_, count)| **count >= self.config.min_topic_size)
            .map(|(term, &count)| (*term, count))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut seeds = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for (term, count) in candidates {
            if seeds.len() >= self.config.max_topics {
                break;
            }
            let holders: Vec<usize> = docs
                .iter()
                .enumerate()
                .filter(|(_, counts)| counts.contains_key(term))
                .map(|(i, _)| i)
                .collect();
            let overlap = holders.iter().filter(|i| covered.contains(*i)).count();
            #[allow(clippy::cast_precision_loss)]
            let overlap_share = overlap as f64 / count as f64;
            if !seeds.is_empty() && overlap_share >= SEED_OVERLAP_LIMIT {
                continue;
            }
            covered.extend(holders);
            seeds.push(term);
        }

        seeds
    }

    /// Name a cluster after its highest weighted terms.
    fn cluster_name(
        id: i32,
        members: &[usize],
        docs: &[TermCounts<'_>],
        df: &BTreeMap<&str, usize>,
    ) -> Option<String> {
        let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
        for &doc in members {
            for (term, &tf) in &docs[doc] {
                #[allow(clippy::cast_precision_loss)]
                let w = tf as f64 * idf(docs.len(), df[term]);
                *weights.entry(*term).or_insert(0.0) += w;
            }
        }
        if weights.is_empty() {
            return None;
        }

        let mut ranked: Vec<(&str, f64)> = weights.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let words: Vec<&str> = ranked.iter().take(NAME_TERMS).map(|(t, _)| *t).collect();
        Some(format!("{id}_{}", words.join("_")))
    }
}

impl TopicModel for KeywordTopicModel {
    fn fit_and_assign(&self, docs: &[Vec<String>]) -> Result<TopicAssignment, AdapterError> {
        let counts: Vec<TermCounts<'_>> = docs.iter().map(|d| term_counts(d)).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *df.entry(*term).or_insert(0) += 1;
            }
        }

        let seeds = self.select_seeds(&counts, &df);

        // Seed index per document, `None` for outliers.
        let mut assigned: Vec<Option<usize>> = counts
            .iter()
            .map(|doc| {
                let mut best: Option<(usize, f64)> = None;
                for (rank, seed) in seeds.iter().enumerate() {
                    let Some(&tf) = doc.get(seed) else {
                        continue;
                    };
                    #[allow(clippy::cast_precision_loss)]
                    let weight = tf as f64 * idf(counts.len(), df[seed]);
                    if best.map_or(true, |(_, w)| weight > w) {
                        best = Some((rank, weight));
                    }
                }
                best.map(|(rank, _)| rank)
            })
            .collect();

        let mut sizes = vec![0_usize; seeds.len()];
        for seed in assigned.iter().flatten() {
            sizes[*seed] += 1;
        }
        for slot in &mut assigned {
            if let Some(seed) = *slot {
                if sizes[seed] < self.config.min_topic_size {
                    *slot = None;
                }
            }
        }

        let mut surviving: Vec<usize> = (0..seeds.len())
            .filter(|&s| sizes[s] >= self.config.min_topic_size)
            .collect();
        surviving.sort_by(|a, b| sizes[*b].cmp(&sizes[*a]).then_with(|| a.cmp(b)));

        let mut topic_of_seed: BTreeMap<usize, i32> = BTreeMap::new();
        for (id, seed) in surviving.iter().enumerate() {
            let id = i32::try_from(id)
                .map_err(|_| AdapterError::Engine("too many topics".to_string()))?;
            topic_of_seed.insert(*seed, id);
        }

        let topic_ids: Vec<i32> = assigned
            .iter()
            .map(|slot| {
                slot.and_then(|seed| topic_of_seed.get(&seed).copied())
                    .unwrap_or(OUTLIER_TOPIC)
            })
            .collect();

        let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (doc, id) in topic_ids.iter().enumerate() {
            members.entry(*id).or_default().push(doc);
        }

        let mut names = BTreeMap::new();
        for (id, docs_in_topic) in &members {
            let name = Self::cluster_name(*id, docs_in_topic, &counts, &df);
            match name {
                Some(name) => {
                    names.insert(*id, name);
                }
                None if *id == OUTLIER_TOPIC => {
                    names.insert(*id, OUTLIER_TOPIC_NAME.to_string());
                }
                None => {
                    return Err(AdapterError::Engine(format!(
                        "topic {id} has no terms to name it by"
                    )));
                }
            }
        }
        names
            .entry(OUTLIER_TOPIC)
            .or_insert_with(|| OUTLIER_TOPIC_NAME.to_string());

        tracing::debug!(
            documents = docs.len(),
            seeds = seeds.len(),
            topics = surviving.len(),
            "keyword topic model fitted"
        );

        Ok(TopicAssignment { topic_ids, names })
    }
}
