//! One subreddit run: both entity pipelines, join, relevance, canonical table.

use std::path::Path;

use threadscope_core::AnalysisConfig;

use crate::adapters::{Adapters, TopicMapping};
use crate::error::AnalysisError;
use crate::export::{export_results, ExportReceipt};
use crate::join::{canonicalize, left_join, score_relevance, ResultTable};
use crate::pipeline::{EntityOutput, EntityPipeline};
use crate::summary::AnalysisSummary;
use crate::types::{Processed, RawComment, RawPost};

/// Analysis of one subreddit/sort-order sample.
///
/// Holds the raw inputs, both processed entity tables and, once a run has
/// succeeded, the canonical result table. A failed run leaves no result.
#[derive(Debug)]
pub struct SubredditAnalysis {
    config: AnalysisConfig,
    adapters: Adapters,
    raw_posts: Vec<RawPost>,
    raw_comments: Vec<RawComment>,
    posts: Option<EntityOutput<RawPost>>,
    comments: Option<EntityOutput<RawComment>>,
    result: Option<ResultTable>,
    summary: Option<AnalysisSummary>,
}

impl SubredditAnalysis {
    #[must_use]
    pub fn new(config: AnalysisConfig, adapters: Adapters) -> Self {
        Self {
            config,
            adapters,
            raw_posts: Vec::new(),
            raw_comments: Vec::new(),
            posts: None,
            comments: None,
            result: None,
            summary: None,
        }
    }

    fn post_pipeline(&self) -> EntityPipeline {
        EntityPipeline::new(
            self.config.max_posts,
            self.adapters.topic.clone(),
            self.adapters.sentiment.clone(),
        )
    }

    fn comment_pipeline(&self) -> EntityPipeline {
        EntityPipeline::new(
            self.config.max_comments,
            self.adapters.topic.clone(),
            self.adapters.sentiment.clone(),
        )
    }

    fn reset(&mut self) {
        self.posts = None;
        self.comments = None;
        self.result = None;
        self.summary = None;
    }

    fn log_start(&self, posts: usize, comments: usize) {
        tracing::info!(
            subreddit = %self.config.subreddit,
            sort_order = %self.config.sort_order,
            posts,
            comments,
            "analysis started"
        );
        if posts == 0 {
            tracing::info!(subreddit = %self.config.subreddit, "no posts; result will be empty");
        } else if comments == 0 {
            tracing::info!(
                subreddit = %self.config.subreddit,
                "no comments; every row will have an empty comment side"
            );
        }
    }

    /// Run the posts pipeline, then the comments pipeline, then join.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError`] raised by any stage; the analysis
    /// then holds no result.
    pub fn run(
        &mut self,
        posts: Vec<RawPost>,
        comments: Vec<RawComment>,
    ) -> Result<&ResultTable, AnalysisError> {
        self.reset();
        self.log_start(posts.len(), comments.len());

        let post_output = self.post_pipeline().run(&posts)?;
        let comment_output = self.comment_pipeline().run(&comments)?;

        self.finish(posts, comments, post_output, comment_output)
    }

    /// Like [`SubredditAnalysis::run`], but the two entity pipelines run
    /// concurrently on the blocking thread pool.
    ///
    /// Output is identical to the sequential run.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError`] raised by any stage, posts first,
    /// or [`AnalysisError::Task`] if a pipeline task panicked.
    pub async fn run_concurrent(
        &mut self,
        posts: Vec<RawPost>,
        comments: Vec<RawComment>,
    ) -> Result<&ResultTable, AnalysisError> {
        self.reset();
        self.log_start(posts.len(), comments.len());

        let post_pipeline = self.post_pipeline();
        let comment_pipeline = self.comment_pipeline();
        let post_task = tokio::task::spawn_blocking(move || {
            post_pipeline.run(&posts).map(|output| (posts, output))
        });
        let comment_task = tokio::task::spawn_blocking(move || {
            comment_pipeline
                .run(&comments)
                .map(|output| (comments, output))
        });

        let (post_result, comment_result) = tokio::try_join!(post_task, comment_task)
            .map_err(|e| AnalysisError::Task(e.to_string()))?;
        let (posts, post_output) = post_result?;
        let (comments, comment_output) = comment_result?;

        self.finish(posts, comments, post_output, comment_output)
    }

    fn finish(
        &mut self,
        raw_posts: Vec<RawPost>,
        raw_comments: Vec<RawComment>,
        post_output: EntityOutput<RawPost>,
        comment_output: EntityOutput<RawComment>,
    ) -> Result<&ResultTable, AnalysisError> {
        let pairs = left_join(&post_output.rows, &comment_output.rows);
        let records = score_relevance(
            &pairs,
            self.adapters.relevance.as_ref(),
            self.config.relevance_text,
        )?;
        let table = canonicalize(&records)?;
        let summary = AnalysisSummary::new(&post_output, &comment_output, &records);

        tracing::info!(
            subreddit = %self.config.subreddit,
            sort_order = %self.config.sort_order,
            rows = table.len(),
            null_comment_rows = summary.null_comment_rows,
            "analysis complete"
        );

        self.raw_posts = raw_posts;
        self.raw_comments = raw_comments;
        self.posts = Some(post_output);
        self.comments = Some(comment_output);
        self.summary = Some(summary);
        Ok(&*self.result.insert(table))
    }

    /// Export the result table under `base`, or the configured results directory.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ExportPrecondition`] if no run has completed,
    /// or an I/O error from the exporter.
    pub fn save_to_file(&self, base: Option<&Path>) -> Result<ExportReceipt, AnalysisError> {
        export_results(
            self.result.as_ref(),
            &self.config.subreddit,
            self.config.sort_order,
            base.unwrap_or(&self.config.results_dir),
        )
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn raw_posts(&self) -> &[RawPost] {
        &self.raw_posts
    }

    #[must_use]
    pub fn raw_comments(&self) -> &[RawComment] {
        &self.raw_comments
    }

    #[must_use]
    pub fn processed_posts(&self) -> Option<&[Processed<RawPost>]> {
        self.posts.as_ref().map(|o| o.rows.as_slice())
    }

    #[must_use]
    pub fn processed_comments(&self) -> Option<&[Processed<RawComment>]> {
        self.comments.as_ref().map(|o| o.rows.as_slice())
    }

    #[must_use]
    pub fn post_topics(&self) -> Option<&TopicMapping> {
        self.posts.as_ref().map(|o| &o.topics)
    }

    #[must_use]
    pub fn comment_topics(&self) -> Option<&TopicMapping> {
        self.comments.as_ref().map(|o| &o.topics)
    }

    #[must_use]
    pub fn result(&self) -> Option<&ResultTable> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&AnalysisSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
