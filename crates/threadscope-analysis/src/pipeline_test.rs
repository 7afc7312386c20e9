use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::adapters::{TopicAssignment, OUTLIER_TOPIC};
use crate::scorer::LexiconSentiment;
use crate::topics::KeywordTopicModel;
use crate::types::{EntityKind, RawComment, RawPost};

/// Puts every non-empty document in topic 0 and empty ones in the outlier topic.
#[derive(Default)]
struct CountingTopics {
    calls: AtomicUsize,
}

impl TopicModel for CountingTopics {
    fn fit_and_assign(&self, docs: &[Vec<String>]) -> Result<TopicAssignment, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let topic_ids = docs
            .iter()
            .map(|d| if d.is_empty() { OUTLIER_TOPIC } else { 0 })
            .collect();
        let names = BTreeMap::from([
            (OUTLIER_TOPIC, "-1_noise".to_string()),
            (0, "0_everything".to_string()),
        ]);
        Ok(TopicAssignment { topic_ids, names })
    }
}

/// Returns a fixed assignment regardless of input.
struct FixedTopics(TopicAssignment);

impl TopicModel for FixedTopics {
    fn fit_and_assign(&self, _docs: &[Vec<String>]) -> Result<TopicAssignment, AdapterError> {
        Ok(self.0.clone())
    }
}

struct FailingSentiment;

impl SentimentModel for FailingSentiment {
    fn score(&self, _texts: &[&str]) -> Result<Vec<f32>, AdapterError> {
        Err(AdapterError::Engine("model not loaded".to_string()))
    }
}

struct ConstantSentiment(Vec<f32>);

impl SentimentModel for ConstantSentiment {
    fn score(&self, _texts: &[&str]) -> Result<Vec<f32>, AdapterError> {
        Ok(self.0.clone())
    }
}

/// Returns NaN for empty text, the way engines that cannot score it do.
struct NanWhenEmpty;

impl SentimentModel for NanWhenEmpty {
    fn score(&self, texts: &[&str]) -> Result<Vec<f32>, AdapterError> {
        Ok(texts
            .iter()
            .map(|t| if t.is_empty() { f32::NAN } else { 0.5 })
            .collect())
    }
}

fn post(id: &str, body: &str) -> RawPost {
    serde_json::from_value(serde_json::json!({
        "post_id": id,
        "title": format!("title {id}"),
        "body": body,
    }))
    .unwrap()
}

fn comment(id: &str, post_id: &str, text: &str) -> RawComment {
    serde_json::from_value(serde_json::json!({
        "comment_id": id,
        "post_id": post_id,
        "comment": text,
    }))
    .unwrap()
}

fn pipeline(max_rows: usize) -> EntityPipeline {
    EntityPipeline::new(
        max_rows,
        Arc::new(CountingTopics::default()),
        Arc::new(LexiconSentiment),
    )
}

#[test]
fn truncation_keeps_first_records_in_ingestion_order() {
    let posts: Vec<RawPost> = (1..=5)
        .map(|i| post(&format!("p{i}"), "some body text"))
        .collect();
    let out = pipeline(1).run(&posts).unwrap();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].record.post_id, "p1");
}

#[test]
fn rows_keep_count_and_order_and_tags_align() {
    let comments = vec![
        comment("c1", "p1", "This is a great explanation"),
        comment("c2", "p1", ""),
        comment("c3", "p2", "The compiler output is confusing"),
    ];
    let out = pipeline(100).run(&comments).unwrap();
    let ids: Vec<&str> = out.rows.iter().map(|r| r.record.comment_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    for row in &out.rows {
        assert_eq!(row.tokens.len(), row.tags.len());
    }
}

#[test]
fn every_row_gets_a_topic_name() {
    let comments = vec![
        comment("c1", "p1", "hello world"),
        comment("c2", "p1", ""),
    ];
    let out = pipeline(100).run(&comments).unwrap();
    assert_eq!(out.rows[0].topic_name, "0_everything");
    assert_eq!(out.rows[1].topic_id, OUTLIER_TOPIC);
    assert_eq!(out.rows[1].topic_name, "-1_noise");
}

#[test]
fn empty_text_has_no_sentiment() {
    let comments = vec![
        comment("c1", "p1", "this is great"),
        comment("c2", "p1", "   "),
    ];
    let out = pipeline(100).run(&comments).unwrap();
    assert!(out.rows[0].sentiment.unwrap() > 0.0);
    assert!(out.rows[1].sentiment.is_none());
}

#[test]
fn empty_input_skips_adapters() {
    let topics = Arc::new(CountingTopics::default());
    let p = EntityPipeline::new(10, topics.clone(), Arc::new(FailingSentiment));
    let out = p.run::<RawComment>(&[]).unwrap();
    assert!(out.rows.is_empty());
    assert_eq!(topics.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out.topics.resolve(OUTLIER_TOPIC).unwrap(), "-1_outliers");
}

#[test]
fn topic_row_count_mismatch_is_adapter_failure() {
    let fixed = FixedTopics(TopicAssignment {
        topic_ids: vec![0],
        names: BTreeMap::from([(0, "0_x".to_string())]),
    });
    let p = EntityPipeline::new(10, Arc::new(fixed), Arc::new(LexiconSentiment));
    let err = p
        .run(&[post("p1", "a b c"), post("p2", "d e f")])
        .unwrap_err();
    assert!(
        matches!(
            err,
            AnalysisError::AdapterFailure {
                stage: Stage::Topic,
                entity: EntityKind::Post,
                source: AdapterError::RowCount { .. },
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn unmapped_topic_id_is_adapter_failure() {
    let fixed = FixedTopics(TopicAssignment {
        topic_ids: vec![0, 7],
        names: BTreeMap::from([(0, "0_x".to_string())]),
    });
    let p = EntityPipeline::new(10, Arc::new(fixed), Arc::new(LexiconSentiment));
    let err = p
        .run(&[post("p1", "a b c"), post("p2", "d e f")])
        .unwrap_err();
    assert!(
        matches!(
            err,
            AnalysisError::AdapterFailure {
                stage: Stage::Topic,
                source: AdapterError::UnmappedTopic(7),
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn sentiment_failure_names_stage_and_entity() {
    let p = EntityPipeline::new(
        10,
        Arc::new(CountingTopics::default()),
        Arc::new(FailingSentiment),
    );
    let err = p.run(&[comment("c1", "p1", "text")]).unwrap_err();
    assert!(
        matches!(
            err,
            AnalysisError::AdapterFailure {
                stage: Stage::Sentiment,
                entity: EntityKind::Comment,
                ..
            }
        ),
        "got {err:?}"
    );
    assert_eq!(
        err.to_string(),
        "sentiment adapter failed for comments: engine error: model not loaded"
    );
}

#[test]
fn sentiment_row_count_mismatch_is_adapter_failure() {
    let p = EntityPipeline::new(
        10,
        Arc::new(CountingTopics::default()),
        Arc::new(ConstantSentiment(vec![0.1])),
    );
    let err = p
        .run(&[comment("c1", "p1", "one"), comment("c2", "p1", "two")])
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::AdapterFailure {
            stage: Stage::Sentiment,
            source: AdapterError::RowCount {
                expected: 2,
                found: 1
            },
            ..
        }
    ));
}

#[test]
fn out_of_range_sentiment_is_adapter_failure() {
    let p = EntityPipeline::new(
        10,
        Arc::new(CountingTopics::default()),
        Arc::new(ConstantSentiment(vec![f32::NAN])),
    );
    let err = p.run(&[comment("c1", "p1", "one")]).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::AdapterFailure {
            source: AdapterError::OutOfRange { .. },
            ..
        }
    ));
}

#[test]
fn nan_for_empty_text_is_not_out_of_range() {
    let p = EntityPipeline::new(
        10,
        Arc::new(CountingTopics::default()),
        Arc::new(NanWhenEmpty),
    );
    let out = p
        .run(&[comment("c1", "p1", "hello"), comment("c2", "p1", "")])
        .unwrap();
    let scores: Vec<Option<f32>> = out.rows.iter().map(|r| r.sentiment).collect();
    assert_eq!(scores, vec![Some(0.5), None]);
}

#[test]
fn builtin_engines_run_end_to_end() {
    let p = EntityPipeline::new(
        10,
        Arc::new(KeywordTopicModel::default()),
        Arc::new(LexiconSentiment),
    );
    let posts = vec![
        post("p1", "The borrow checker is great once it clicks"),
        post("p2", "Borrow checker errors are confusing"),
        post("p3", ""),
    ];
    let out = p.run(&posts).unwrap();
    assert_eq!(out.rows.len(), 3);
    assert_eq!(out.rows[0].topic_id, out.rows[1].topic_id);
    for row in &out.rows {
        assert!(out.topics.resolve(row.topic_id).is_ok());
    }
}
