//! Topic, sentiment and relevance analysis of subreddit threads.
//!
//! Raw posts and comments each pass through an [`EntityPipeline`]
//! (truncation, preprocessing, topic modeling, sentiment). The processed
//! tables are left-joined on post id, every comment is scored for relevance
//! to its post, and the joined rows are relabeled into the fixed
//! [`CANONICAL_COLUMNS`] schema before being exported as CSV.
//!
//! The topic, sentiment and relevance engines sit behind the [`TopicModel`],
//! [`SentimentModel`] and [`RelevanceModel`] traits. [`Adapters::builtin`]
//! wires up the deterministic in-process engines.

pub mod adapters;
pub mod analysis;
pub mod error;
pub mod export;
pub mod input;
pub mod join;
pub mod pipeline;
pub mod preprocess;
pub mod relevance;
pub mod scorer;
pub mod summary;
pub mod topics;
pub mod types;

mod de;

pub use adapters::{
    Adapters, RelevanceModel, SentimentModel, TopicAssignment, TopicMapping, TopicModel,
    OUTLIER_TOPIC, OUTLIER_TOPIC_NAME,
};
pub use analysis::SubredditAnalysis;
pub use error::{AdapterError, AnalysisError, Stage};
pub use export::{export_results, results_file_name, ExportReceipt};
pub use input::load_records;
pub use join::{canonicalize, left_join, relabel, score_relevance, ResultTable, CANONICAL_COLUMNS};
pub use pipeline::{EntityOutput, EntityPipeline};
pub use preprocess::preprocess;
pub use relevance::{cosine_relevance, CosineRelevance};
pub use scorer::{lexicon_score, LexiconSentiment};
pub use summary::AnalysisSummary;
pub use topics::KeywordTopicModel;
pub use types::{Cell, Entity, EntityKind, Processed, RawComment, RawPost};
