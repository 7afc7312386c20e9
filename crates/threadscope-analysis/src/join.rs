//! Post/comment join, relevance scoring and canonical schema relabeling.

use std::collections::HashMap;

use threadscope_core::PostTextMode;

use crate::adapters::RelevanceModel;
use crate::error::{AdapterError, AnalysisError, Stage};
use crate::types::{Cell, EntityKind, Processed, RawComment, RawPost};

/// Column names of the exported result table, in order.
///
/// Reporting reads these by name; renaming or reordering is a breaking change.
pub const CANONICAL_COLUMNS: &[&str] = &[
    "post_index",
    "post_id",
    "post_title",
    "post_score",
    "post_upvote_ratio",
    "subreddit",
    "post_url",
    "num_comments",
    "post_body",
    "post_created",
    "post_body_word_token",
    "post_body_tag",
    "post_body_string",
    "post_topic_id",
    "post_topics",
    "post_sentiment",
    "comment_index",
    "comment_id",
    "parent_id",
    "comment",
    "comment_up_vote_count",
    "comment_down_vote_count",
    "comment_controversiality",
    "comment_total_awards_received",
    "comment_score",
    "comment_is_locked",
    "comment_is_collapsed",
    "comment_is_submitter",
    "comment_created_utc",
    "comment_word_token",
    "comment_tag",
    "comment_body_string",
    "comment_topic_id",
    "comment_topics",
    "comment_sentiment",
    "comment_relevance",
];

/// One post paired with one of its comments, or with nothing.
#[derive(Debug, Clone, Copy)]
pub struct JoinedPair<'a> {
    pub post: &'a Processed<RawPost>,
    pub comment: Option<&'a Processed<RawComment>>,
}

/// A joined pair with its relevance score attached.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRecord<'a> {
    pub post: &'a Processed<RawPost>,
    pub comment: Option<&'a Processed<RawComment>>,
    /// `None` exactly when `comment` is `None`.
    pub relevance: Option<f32>,
}

impl JoinedRecord<'_> {
    /// Flatten into cells in canonical column order.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = self.post.cells();
        match self.comment {
            Some(comment) => cells.extend(comment.cells()),
            None => cells.resize(cells.len() + Processed::<RawComment>::WIDTH, Cell::Null),
        }
        cells.push(self.relevance.map_or(Cell::Null, Cell::Score));
        cells
    }
}

/// Left-join posts to comments on post identity.
///
/// Every post appears at least once; a post with N comments appears N times.
/// Output follows post order, then comment order within each post. Comments
/// whose post was not sampled are dropped.
#[must_use]
pub fn left_join<'a>(
    posts: &'a [Processed<RawPost>],
    comments: &'a [Processed<RawComment>],
) -> Vec<JoinedPair<'a>> {
    let mut by_post: HashMap<&str, Vec<&Processed<RawComment>>> = HashMap::new();
    for comment in comments {
        by_post
            .entry(comment.record.post_id.as_str())
            .or_default()
            .push(comment);
    }

    let mut joined = Vec::with_capacity(posts.len().max(comments.len()));
    let mut matched = 0_usize;
    for post in posts {
        match by_post.get(post.record.post_id.as_str()) {
            Some(children) => {
                matched += children.len();
                joined.extend(children.iter().map(|comment| JoinedPair {
                    post,
                    comment: Some(*comment),
                }));
            }
            None => joined.push(JoinedPair {
                post,
                comment: None,
            }),
        }
    }

    let orphaned = comments.len().saturating_sub(matched);
    if orphaned > 0 {
        tracing::debug!(orphaned, "comments without a sampled post were dropped");
    }

    joined
}

/// The text of a post that comments are compared against.
#[must_use]
pub fn post_relevance_text(post: &RawPost, mode: PostTextMode) -> String {
    match mode {
        PostTextMode::Title => post.title_text().to_string(),
        PostTextMode::Body => post.body_text().to_string(),
        PostTextMode::TitleBody => match (post.title_text(), post.body_text()) {
            (title, "") => title.to_string(),
            ("", body) => body.to_string(),
            (title, body) => format!("{title}\n{body}"),
        },
    }
}

/// Score relevance for every pair that has a comment side.
///
/// The adapter is never called for a pair without a comment.
///
/// # Errors
///
/// Returns [`AnalysisError::AdapterFailure`] on the first failing or non-finite score.
pub fn score_relevance<'a>(
    pairs: &[JoinedPair<'a>],
    model: &dyn RelevanceModel,
    mode: PostTextMode,
) -> Result<Vec<JoinedRecord<'a>>, AnalysisError> {
    let mut post_texts: HashMap<&str, String> = HashMap::new();
    let mut records = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let relevance = match pair.comment {
            None => None,
            Some(comment) => {
                let post_text = post_texts
                    .entry(pair.post.record.post_id.as_str())
                    .or_insert_with(|| post_relevance_text(&pair.post.record, mode));
                let score = model
                    .score_pair(post_text, comment.record.comment.as_deref().unwrap_or(""))
                    .map_err(|e| AnalysisError::adapter(Stage::Relevance, EntityKind::Comment, e))?;
                if !score.is_finite() {
                    return Err(AnalysisError::adapter(
                        Stage::Relevance,
                        EntityKind::Comment,
                        AdapterError::Engine(format!(
                            "non-finite relevance {score} for comment {}",
                            comment.record.comment_id
                        )),
                    ));
                }
                Some(score)
            }
        };
        records.push(JoinedRecord {
            post: pair.post,
            comment: pair.comment,
            relevance,
        });
    }

    Ok(records)
}

/// A table with a fixed, named column list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: &'static [&'static str],
    rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Iterate one column's values top to bottom.
    pub fn column<'s>(&'s self, name: &str) -> Option<impl Iterator<Item = &'s Cell> + 's> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

/// Label positional rows with `columns`.
///
/// Pure relabeling: values, row count and row order are untouched.
///
/// # Errors
///
/// Returns [`AnalysisError::SchemaMismatch`] if any row's width differs from
/// the number of column names.
pub fn relabel(
    columns: &'static [&'static str],
    rows: Vec<Vec<Cell>>,
) -> Result<ResultTable, AnalysisError> {
    if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
        return Err(AnalysisError::SchemaMismatch {
            expected: columns.len(),
            found: row.len(),
        });
    }
    Ok(ResultTable { columns, rows })
}

/// Flatten joined records and relabel them with [`CANONICAL_COLUMNS`].
///
/// # Errors
///
/// Returns [`AnalysisError::SchemaMismatch`] if the flattened width drifts
/// from the canonical column list.
pub fn canonicalize(records: &[JoinedRecord<'_>]) -> Result<ResultTable, AnalysisError> {
    let rows = records.iter().map(JoinedRecord::cells).collect();
    relabel(CANONICAL_COLUMNS, rows)
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
