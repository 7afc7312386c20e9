//! Per-entity pipeline orchestration.

use std::sync::Arc;

use crate::adapters::{SentimentModel, TopicMapping, TopicModel};
use crate::error::{AdapterError, AnalysisError, Stage};
use crate::preprocess::preprocess;
use crate::types::{Entity, Processed};

/// Processed rows for one entity type plus the topic mapping they were resolved against.
#[derive(Debug, Clone)]
pub struct EntityOutput<R> {
    pub rows: Vec<Processed<R>>,
    pub topics: TopicMapping,
}

/// Runs the same stage sequence for posts and for comments.
#[derive(Clone)]
pub struct EntityPipeline {
    max_rows: usize,
    topic: Arc<dyn TopicModel>,
    sentiment: Arc<dyn SentimentModel>,
}

impl EntityPipeline {
    #[must_use]
    pub fn new(
        max_rows: usize,
        topic: Arc<dyn TopicModel>,
        sentiment: Arc<dyn SentimentModel>,
    ) -> Self {
        Self {
            max_rows,
            topic,
            sentiment,
        }
    }

    /// Run the full stage sequence over one entity's raw records.
    ///
    /// 1. Keep the first `max_rows` records in ingestion order.
    /// 2. Tokenize and tag the entity's text column.
    /// 3. Fit the topic model on the token column and resolve every topic name.
    /// 4. Score sentiment on the raw text column.
    ///
    /// Zero records after truncation is not an error: no adapter is called and
    /// the output is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::AdapterFailure`] if an adapter call fails or
    /// returns output that breaks its contract. Nothing partial is returned.
    pub fn run<R: Entity>(&self, records: &[R]) -> Result<EntityOutput<R>, AnalysisError> {
        let entity = R::KIND;

        // Step 1: Sampling boundary, not a filter.
        let sampled = &records[..records.len().min(self.max_rows)];
        if sampled.len() < records.len() {
            tracing::debug!(
                %entity,
                kept = sampled.len(),
                dropped = records.len() - sampled.len(),
                "truncated to configured maximum"
            );
        }

        // Step 2: Preprocess.
        let preprocessed = preprocess(sampled);

        if preprocessed.is_empty() {
            tracing::info!(%entity, "no records after truncation; skipping adapters");
            let topics = TopicMapping::validate(&Default::default(), 0)
                .map_err(|e| AnalysisError::adapter(Stage::Topic, entity, e))?;
            return Ok(EntityOutput {
                rows: Vec::new(),
                topics,
            });
        }

        // Step 3: Topic modeling, one batched call.
        let docs: Vec<Vec<String>> = preprocessed.iter().map(|p| p.tokens.clone()).collect();
        let assignment = self
            .topic
            .fit_and_assign(&docs)
            .map_err(|e| AnalysisError::adapter(Stage::Topic, entity, e))?;
        let topics = TopicMapping::validate(&assignment, docs.len())
            .map_err(|e| AnalysisError::adapter(Stage::Topic, entity, e))?;

        // Step 4: Sentiment on the raw text, one batched call.
        let texts: Vec<&str> = preprocessed.iter().map(|p| p.record.text()).collect();
        let scores = self
            .sentiment
            .score(&texts)
            .map_err(|e| AnalysisError::adapter(Stage::Sentiment, entity, e))?;
        if scores.len() != texts.len() {
            return Err(AnalysisError::adapter(
                Stage::Sentiment,
                entity,
                AdapterError::RowCount {
                    expected: texts.len(),
                    found: scores.len(),
                },
            ));
        }
        // Sentiment is undefined for empty text, so those scores are not checked.
        if let Some(bad) = texts
            .iter()
            .zip(&scores)
            .filter(|(text, _)| !text.trim().is_empty())
            .map(|(_, &score)| score)
            .find(|score| !(-1.0..=1.0).contains(score))
        {
            return Err(AnalysisError::adapter(
                Stage::Sentiment,
                entity,
                AdapterError::OutOfRange {
                    score: bad,
                    min: -1.0,
                    max: 1.0,
                },
            ));
        }

        let mut rows = Vec::with_capacity(preprocessed.len());
        for ((pre, topic_id), score) in preprocessed
            .into_iter()
            .zip(assignment.topic_ids)
            .zip(scores)
        {
            let topic_name = topics
                .resolve(topic_id)
                .map_err(|e| AnalysisError::adapter(Stage::Topic, entity, e))?
                .to_string();
            let sentiment = if pre.record.text().trim().is_empty() {
                None
            } else {
                Some(score)
            };
            rows.push(Processed::from_preprocessed(
                pre, topic_id, topic_name, sentiment,
            ));
        }

        tracing::info!(
            %entity,
            rows = rows.len(),
            topics = topics.len(),
            "entity pipeline complete"
        );

        Ok(EntityOutput { rows, topics })
    }
}

impl std::fmt::Debug for EntityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityPipeline")
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
