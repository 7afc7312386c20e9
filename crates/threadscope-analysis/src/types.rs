use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::de::{opt_bool, opt_timestamp};

/// Which kind of record a pipeline stage is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Post,
    Comment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Post => write!(f, "posts"),
            EntityKind::Comment => write!(f, "comments"),
        }
    }
}

/// A submission as delivered by the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub index: Option<i64>,
    pub post_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub created: Option<DateTime<Utc>>,
}

impl RawPost {
    #[must_use]
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// A comment as delivered by the scraper. `post_id` is the join key back to its submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub index: Option<i64>,
    pub comment_id: String,
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub up_vote_count: Option<i64>,
    #[serde(default)]
    pub down_vote_count: Option<i64>,
    #[serde(default)]
    pub controversiality: Option<i64>,
    #[serde(default)]
    pub total_awards_received: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "opt_bool")]
    pub is_locked: Option<bool>,
    #[serde(default, deserialize_with = "opt_bool")]
    pub is_collapsed: Option<bool>,
    #[serde(default, deserialize_with = "opt_bool")]
    pub is_submitter: Option<bool>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub created_utc: Option<DateTime<Utc>>,
}

/// A raw record the entity pipeline can process.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    /// Number of cells produced by [`Entity::cells`].
    const FIELD_COUNT: usize;

    fn id(&self) -> &str;

    /// The free-text column that gets tokenized, topic-modeled and scored.
    fn text(&self) -> &str;

    /// Raw fields in canonical column order.
    fn cells(&self) -> Vec<Cell>;
}

impl Entity for RawPost {
    const KIND: EntityKind = EntityKind::Post;
    const FIELD_COUNT: usize = 10;

    fn id(&self) -> &str {
        &self.post_id
    }

    fn text(&self) -> &str {
        self.body_text()
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.index.into(),
            Cell::Text(self.post_id.clone()),
            self.title.clone().into(),
            self.score.into(),
            self.upvote_ratio.map_or(Cell::Null, Cell::Float),
            self.subreddit.clone().into(),
            self.url.clone().into(),
            self.num_comments.into(),
            self.body.clone().into(),
            self.created.map_or(Cell::Null, Cell::Timestamp),
        ]
    }
}

impl Entity for RawComment {
    const KIND: EntityKind = EntityKind::Comment;
    const FIELD_COUNT: usize = 13;

    fn id(&self) -> &str {
        &self.comment_id
    }

    fn text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.index.into(),
            Cell::Text(self.comment_id.clone()),
            self.parent_id.clone().into(),
            self.comment.clone().into(),
            self.up_vote_count.into(),
            self.down_vote_count.into(),
            self.controversiality.into(),
            self.total_awards_received.into(),
            self.score.into(),
            self.is_locked.map_or(Cell::Null, Cell::Bool),
            self.is_collapsed.map_or(Cell::Null, Cell::Bool),
            self.is_submitter.map_or(Cell::Null, Cell::Bool),
            self.created_utc.map_or(Cell::Null, Cell::Timestamp),
        ]
    }
}

/// Output of the preprocessor: the raw record plus its token and tag columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed<R> {
    pub record: R,
    pub tokens: Vec<String>,
    /// Part-of-speech tags, one per token.
    pub tags: Vec<&'static str>,
    /// Tokens joined by single spaces.
    pub token_string: String,
}

/// A fully processed record: tokens, topic and sentiment attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed<R> {
    pub record: R,
    pub tokens: Vec<String>,
    pub tags: Vec<&'static str>,
    pub token_string: String,
    pub topic_id: i32,
    pub topic_name: String,
    /// `None` when the source text is empty.
    pub sentiment: Option<f32>,
}

/// Cells appended after the raw fields of every processed record.
pub const PROCESSED_FIELD_COUNT: usize = 6;

impl<R: Entity> Processed<R> {
    pub(crate) fn from_preprocessed(
        pre: Preprocessed<R>,
        topic_id: i32,
        topic_name: String,
        sentiment: Option<f32>,
    ) -> Self {
        Self {
            record: pre.record,
            tokens: pre.tokens,
            tags: pre.tags,
            token_string: pre.token_string,
            topic_id,
            topic_name,
            sentiment,
        }
    }

    /// Total cell width of one processed record.
    pub const WIDTH: usize = R::FIELD_COUNT + PROCESSED_FIELD_COUNT;

    /// Raw fields followed by tokens, tags, cleaned text, topic id, topic name and sentiment.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = self.record.cells();
        cells.push(Cell::List(self.tokens.clone()));
        cells.push(Cell::List(
            self.tags.iter().map(|t| (*t).to_string()).collect(),
        ));
        cells.push(Cell::Text(self.token_string.clone()));
        cells.push(Cell::Int(i64::from(self.topic_id)));
        cells.push(Cell::Text(self.topic_name.clone()));
        cells.push(self.sentiment.map_or(Cell::Null, Cell::Score));
        cells
    }
}

/// One value of the canonical result table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    /// Model output (sentiment, relevance).
    Score(f32),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    List(Vec<String>),
}

impl Cell {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render the cell as a CSV field. Null renders as an empty field.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(x) => x.to_string(),
            Cell::Score(x) => x.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
            Cell::List(items) => serde_json::to_string(items).unwrap_or_default(),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Int)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Null, Cell::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> RawPost {
        RawPost {
            index: Some(0),
            post_id: "p1".to_string(),
            title: Some("Title".to_string()),
            score: Some(10),
            upvote_ratio: Some(0.5),
            subreddit: Some("rust".to_string()),
            url: None,
            num_comments: Some(2),
            body: None,
            created: DateTime::from_timestamp(1_700_000_000, 0),
        }
    }

    #[test]
    fn field_counts_match_cells() {
        assert_eq!(post().cells().len(), RawPost::FIELD_COUNT);
        let comment: RawComment =
            serde_json::from_str(r#"{"comment_id": "c1", "post_id": "p1"}"#).unwrap();
        assert_eq!(comment.cells().len(), RawComment::FIELD_COUNT);
    }

    #[test]
    fn missing_body_reads_as_empty_text() {
        assert_eq!(post().text(), "");
    }

    #[test]
    fn cells_render_for_csv() {
        assert_eq!(Cell::Null.render(), "");
        assert_eq!(Cell::Bool(true).render(), "true");
        assert_eq!(Cell::Score(0.25).render(), "0.25");
        assert_eq!(
            Cell::List(vec!["a".to_string(), "b".to_string()]).render(),
            r#"["a","b"]"#
        );
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(Cell::Timestamp(ts).render(), "2023-11-14T22:13:20Z");
    }
}
