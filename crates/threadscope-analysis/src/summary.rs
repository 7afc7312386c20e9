use std::fmt;

use crate::join::JoinedRecord;
use crate::pipeline::EntityOutput;
use crate::types::{RawComment, RawPost};

/// Headline numbers for one completed run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSummary {
    pub rows: usize,
    pub posts: usize,
    pub comments: usize,
    /// Result rows whose comment side is empty.
    pub null_comment_rows: usize,
    /// Distinct topic ids assigned to posts, outliers included.
    pub post_topics: usize,
    pub comment_topics: usize,
    pub mean_post_sentiment: Option<f64>,
    pub mean_comment_sentiment: Option<f64>,
    pub mean_relevance: Option<f64>,
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_u32), |(sum, count), v| {
        (sum + f64::from(v), count + 1)
    });
    (count > 0).then(|| sum / f64::from(count))
}

fn distinct_topics<R>(output: &EntityOutput<R>) -> usize {
    let mut ids: Vec<i32> = output.rows.iter().map(|r| r.topic_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

impl AnalysisSummary {
    #[must_use]
    pub fn new(
        posts: &EntityOutput<RawPost>,
        comments: &EntityOutput<RawComment>,
        records: &[JoinedRecord<'_>],
    ) -> Self {
        Self {
            rows: records.len(),
            posts: posts.rows.len(),
            comments: comments.rows.len(),
            null_comment_rows: records.iter().filter(|r| r.comment.is_none()).count(),
            post_topics: distinct_topics(posts),
            comment_topics: distinct_topics(comments),
            mean_post_sentiment: mean(posts.rows.iter().filter_map(|r| r.sentiment)),
            mean_comment_sentiment: mean(comments.rows.iter().filter_map(|r| r.sentiment)),
            mean_relevance: mean(records.iter().filter_map(|r| r.relevance)),
        }
    }
}

struct Score(Option<f64>);

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.3}"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rows: {} ({} without comments)",
            self.rows, self.null_comment_rows
        )?;
        writeln!(
            f,
            "posts: {}  topics: {}  mean sentiment: {}",
            self.posts,
            self.post_topics,
            Score(self.mean_post_sentiment)
        )?;
        writeln!(
            f,
            "comments: {}  topics: {}  mean sentiment: {}",
            self.comments,
            self.comment_topics,
            Score(self.mean_comment_sentiment)
        )?;
        write!(f, "mean relevance: {}", Score(self.mean_relevance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([0.5_f32, -0.5, 1.0].into_iter()), Some(1.0 / 3.0));
    }

    #[test]
    fn display_marks_missing_means() {
        let summary = AnalysisSummary {
            rows: 1,
            posts: 1,
            null_comment_rows: 1,
            post_topics: 1,
            mean_post_sentiment: Some(0.25),
            ..AnalysisSummary::default()
        };
        let text = summary.to_string();
        assert!(text.contains("rows: 1 (1 without comments)"));
        assert!(text.contains("mean sentiment: 0.250"));
        assert!(text.ends_with("mean relevance: n/a"));
    }
}
