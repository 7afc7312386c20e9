use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_config::SortOrder;
use crate::{validate_subreddit, ConfigError};

/// One subreddit analysis described in a runs file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub subreddit: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Raw post dump (`.json` or `.csv`).
    pub posts: PathBuf,
    /// Raw comment dump (`.json` or `.csv`).
    pub comments: PathBuf,
    pub max_posts: Option<usize>,
    pub max_comments: Option<usize>,
}

fn default_sort_order() -> SortOrder {
    SortOrder::Hot
}

#[derive(Debug, Deserialize)]
pub struct RunsFile {
    pub runs: Vec<RunConfig>,
}

impl RunsFile {
    /// Resolve every relative input path against `base`, usually the runs file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for run in &mut self.runs {
            if run.posts.is_relative() {
                run.posts = base.join(&run.posts);
            }
            if run.comments.is_relative() {
                run.comments = base.join(&run.comments);
            }
        }
    }
}

/// Load and validate a batch of subreddit runs from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_runs(path: &Path) -> Result<RunsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RunsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut runs_file: RunsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RunsFileParse)?;

    validate_runs(&runs_file)?;

    if let Some(parent) = path.parent() {
        runs_file.resolve_paths(parent);
    }

    Ok(runs_file)
}

fn validate_runs(runs_file: &RunsFile) -> Result<(), ConfigError> {
    if runs_file.runs.is_empty() {
        return Err(ConfigError::Validation(
            "runs file must list at least one run".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for run in &runs_file.runs {
        validate_subreddit(&run.subreddit)?;

        if run.max_posts == Some(0) || run.max_comments == Some(0) {
            return Err(ConfigError::Validation(format!(
                "run '{}' ({}) must use positive max_posts/max_comments",
                run.subreddit, run.sort_order
            )));
        }

        // Two runs with the same key would overwrite each other's export.
        if !seen.insert((run.subreddit.to_lowercase(), run.sort_order)) {
            return Err(ConfigError::Validation(format!(
                "duplicate run: '{}' sorted by {}",
                run.subreddit, run.sort_order
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "runs_test.rs"]
mod tests;
