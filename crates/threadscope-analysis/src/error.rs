use thiserror::Error;

use crate::types::EntityKind;

/// Pipeline stage that talks to an external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Topic,
    Sentiment,
    Relevance,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Topic => write!(f, "topic"),
            Stage::Sentiment => write!(f, "sentiment"),
            Stage::Relevance => write!(f, "relevance"),
        }
    }
}

/// Contract violations and engine failures reported by an adapter call.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("engine error: {0}")]
    Engine(String),

    #[error("expected {expected} rows, adapter returned {found}")]
    RowCount { expected: usize, found: usize },

    #[error("topic id {0} has no name in the adapter's mapping")]
    UnmappedTopic(i32),

    #[error("score {score} is outside {min}..={max}")]
    OutOfRange { score: f32, min: f32, max: f32 },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{stage} adapter failed for {entity}: {source}")]
    AdapterFailure {
        stage: Stage,
        entity: EntityKind,
        #[source]
        source: AdapterError,
    },

    #[error("joined row has {found} columns, canonical schema expects {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("export precondition failed: {0}")]
    ExportPrecondition(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid input {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("pipeline task failed: {0}")]
    Task(String),
}

impl AnalysisError {
    pub(crate) fn adapter(stage: Stage, entity: EntityKind, source: AdapterError) -> Self {
        Self::AdapterFailure {
            stage,
            entity,
            source,
        }
    }
}
