//! Capability traits for the external topic, sentiment and relevance engines.

use std::collections::BTreeMap;
use std::sync::Arc;

use threadscope_core::AnalysisConfig;

use crate::error::AdapterError;
use crate::relevance::CosineRelevance;
use crate::scorer::LexiconSentiment;
use crate::topics::KeywordTopicModel;

/// Topic id for documents that fit no discovered cluster.
pub const OUTLIER_TOPIC: i32 = -1;

/// Name given to the outlier topic when the engine never emitted it.
pub const OUTLIER_TOPIC_NAME: &str = "-1_outliers";

/// Result of one batched topic-model call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicAssignment {
    /// One id per input document, in input order.
    pub topic_ids: Vec<i32>,
    pub names: BTreeMap<i32, String>,
}

/// Fits a topic model over a tokenized column and assigns every row a topic.
pub trait TopicModel: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the engine fails.
    fn fit_and_assign(&self, docs: &[Vec<String>]) -> Result<TopicAssignment, AdapterError>;
}

/// Scores the sentiment of each text, in `[-1.0, 1.0]`.
pub trait SentimentModel: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the engine fails.
    fn score(&self, texts: &[&str]) -> Result<Vec<f32>, AdapterError>;
}

/// Scores how relevant a comment is to the post it was left on.
pub trait RelevanceModel: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the engine fails.
    fn score_pair(&self, post_text: &str, comment_text: &str) -> Result<f32, AdapterError>;
}

/// The three engines a pipeline run is wired to.
#[derive(Clone)]
pub struct Adapters {
    pub topic: Arc<dyn TopicModel>,
    pub sentiment: Arc<dyn SentimentModel>,
    pub relevance: Arc<dyn RelevanceModel>,
}

impl Adapters {
    /// The in-process engines shipped with the crate.
    #[must_use]
    pub fn builtin(config: &AnalysisConfig) -> Self {
        Self {
            topic: Arc::new(KeywordTopicModel::new(config.topic_model)),
            sentiment: Arc::new(LexiconSentiment),
            relevance: Arc::new(CosineRelevance),
        }
    }
}

impl std::fmt::Debug for Adapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapters").finish_non_exhaustive()
    }
}

/// A topic-id to name mapping that has been checked against the ids it must cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMapping {
    names: BTreeMap<i32, String>,
}

impl TopicMapping {
    /// Validate an adapter's assignment for a batch of `rows` documents.
    ///
    /// The outlier topic is always present in the returned mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::RowCount`] if the id count differs from `rows`, or
    /// [`AdapterError::UnmappedTopic`] for the first emitted id without a name.
    pub fn validate(assignment: &TopicAssignment, rows: usize) -> Result<Self, AdapterError> {
        if assignment.topic_ids.len() != rows {
            return Err(AdapterError::RowCount {
                expected: rows,
                found: assignment.topic_ids.len(),
            });
        }

        if let Some(&missing) = assignment
            .topic_ids
            .iter()
            .find(|id| !assignment.names.contains_key(*id))
        {
            return Err(AdapterError::UnmappedTopic(missing));
        }

        let mut names = assignment.names.clone();
        names
            .entry(OUTLIER_TOPIC)
            .or_insert_with(|| OUTLIER_TOPIC_NAME.to_string());

        Ok(Self { names })
    }

    /// Look up a topic name.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnmappedTopic`] if `id` was not covered.
    pub fn resolve(&self, id: i32) -> Result<&str, AdapterError> {
        self.names
            .get(&id)
            .map(String::as_str)
            .ok_or(AdapterError::UnmappedTopic(id))
    }

    /// Number of named topics, the outlier topic included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}
