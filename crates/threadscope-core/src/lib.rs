//! Shared configuration types for the threadscope workspace.

pub mod app_config;
pub mod config;
pub mod runs;

use thiserror::Error;

pub use app_config::{AnalysisConfig, PostTextMode, SortOrder, TopicModelConfig};
pub use config::{load_analysis_config, load_analysis_config_from_env};
pub use runs::{load_runs, RunConfig, RunsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read runs file {path}: {source}")]
    RunsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse runs file: {0}")]
    RunsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Check that a subreddit name is usable as a file-name component.
///
/// Reddit names are ASCII letters, digits and underscores; anything else
/// (including path separators) is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if the name is empty or has other characters.
pub fn validate_subreddit(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "subreddit name must be non-empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "subreddit '{name}' may only contain ASCII letters, digits and '_'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subreddit_with_underscore_is_valid() {
        assert!(validate_subreddit("learn_rust").is_ok());
    }

    #[test]
    fn empty_subreddit_is_rejected() {
        assert!(matches!(
            validate_subreddit(""),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn subreddit_with_path_separator_is_rejected() {
        assert!(matches!(
            validate_subreddit("../etc"),
            Err(ConfigError::Validation(_))
        ));
    }
}
