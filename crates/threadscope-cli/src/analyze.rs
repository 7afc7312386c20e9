//! Analysis command handlers for the CLI.
//!
//! Batch runs are independent: a failed run is reported and skipped so one
//! bad dump does not abort the rest, and the command fails at the end.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::Args;
use threadscope_analysis::{
    load_records, Adapters, ExportReceipt, RawComment, RawPost, SubredditAnalysis,
};
use threadscope_core::{AnalysisConfig, RunConfig, SortOrder};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Raw post dump (.json array or .csv)
    #[arg(long)]
    pub posts: PathBuf,

    /// Raw comment dump (.json array or .csv)
    #[arg(long)]
    pub comments: PathBuf,

    /// Subreddit name; overrides THREADSCOPE_SUBREDDIT
    #[arg(long)]
    pub subreddit: Option<String>,

    /// hot, new, top, rising or controversial; overrides THREADSCOPE_SORT_ORDER
    #[arg(long)]
    pub sort_order: Option<SortOrder>,

    /// Keep at most this many posts
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_posts: Option<usize>,

    /// Keep at most this many comments
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_comments: Option<usize>,

    /// Directory the results CSV is written to
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Run the post and comment pipelines one after the other
    #[arg(long)]
    pub sequential: bool,
}

/// Overlay command-line values on the environment configuration.
pub(crate) fn apply_overrides(
    mut config: AnalysisConfig,
    args: &AnalyzeArgs,
) -> anyhow::Result<AnalysisConfig> {
    if let Some(subreddit) = &args.subreddit {
        threadscope_core::validate_subreddit(subreddit)?;
        config.subreddit.clone_from(subreddit);
    }
    if let Some(sort_order) = args.sort_order {
        config.sort_order = sort_order;
    }
    if let Some(max_posts) = args.max_posts {
        config.max_posts = max_posts;
    }
    if let Some(max_comments) = args.max_comments {
        config.max_comments = max_comments;
    }
    if let Some(out_dir) = &args.out_dir {
        config.results_dir.clone_from(out_dir);
    }
    Ok(config)
}

/// Configuration for one batch entry, on top of the environment configuration.
pub(crate) fn config_for_run(base: &AnalysisConfig, run: &RunConfig) -> AnalysisConfig {
    AnalysisConfig {
        subreddit: run.subreddit.clone(),
        sort_order: run.sort_order,
        max_posts: run.max_posts.unwrap_or(base.max_posts),
        max_comments: run.max_comments.unwrap_or(base.max_comments),
        ..base.clone()
    }
}

/// Load both dumps, run the analysis, export, and print the receipt and summary.
async fn analyze_one(
    config: AnalysisConfig,
    posts_path: &Path,
    comments_path: &Path,
    sequential: bool,
) -> anyhow::Result<ExportReceipt> {
    let posts: Vec<RawPost> = load_records(posts_path)?;
    let comments: Vec<RawComment> = load_records(comments_path)?;

    let adapters = Adapters::builtin(&config);
    let mut analysis = SubredditAnalysis::new(config, adapters);
    if sequential {
        analysis.run(posts, comments)?;
    } else {
        analysis.run_concurrent(posts, comments).await?;
    }

    let receipt = analysis.save_to_file(None)?;
    let config = analysis.config();
    println!(
        "r/{} ({}): wrote {} rows to {}",
        config.subreddit,
        config.sort_order,
        receipt.rows,
        receipt.path.display()
    );
    println!("sha256: {}", receipt.sha256);
    if let Some(summary) = analysis.summary() {
        println!("{summary}");
    }

    Ok(receipt)
}

/// Handle `threadscope analyze`.
///
/// # Errors
///
/// Returns an error if the subreddit or an override is invalid, a dump cannot be loaded, or
/// any pipeline stage or the export fails.
pub(crate) async fn run_analyze(config: AnalysisConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    if args.subreddit.is_none() {
        threadscope_core::validate_subreddit(&config.subreddit)
            .context("invalid THREADSCOPE_SUBREDDIT")?;
    }
    analyze_one(config, &args.posts, &args.comments, args.sequential).await?;
    Ok(())
}

/// Handle `threadscope batch`.
///
/// # Errors
///
/// Returns an error if the batch file is invalid or any run failed.
pub(crate) async fn run_batch(config: AnalysisConfig, path: &Path) -> anyhow::Result<()> {
    let runs_file = threadscope_core::load_runs(path)?;
    let total = runs_file.runs.len();
    let mut failed = 0_usize;

    for run in &runs_file.runs {
        let run_config = config_for_run(&config, run);
        if let Err(e) = analyze_one(run_config, &run.posts, &run.comments, false).await {
            eprintln!(
                "error: r/{} ({}) failed: {e:#}",
                run.subreddit, run.sort_order
            );
            tracing::warn!(
                subreddit = %run.subreddit,
                sort_order = %run.sort_order,
                error = %e,
                "batch run failed"
            );
            failed += 1;
        }
    }

    println!("batch complete: {} of {total} runs succeeded", total - failed);
    if failed > 0 {
        anyhow::bail!("{failed} of {total} batch runs failed");
    }
    Ok(())
}
