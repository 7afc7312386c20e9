use crate::app_config::{AnalysisConfig, PostTextMode, SortOrder, TopicModelConfig};
use crate::ConfigError;

/// Load analysis configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_analysis_config() -> Result<AnalysisConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_analysis_config_from_env()
}

/// Load analysis configuration from environment variables already in the process.
///
/// Unlike [`load_analysis_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_analysis_config_from_env() -> Result<AnalysisConfig, ConfigError> {
    build_analysis_config(|key| std::env::var(key))
}

/// Build analysis configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_analysis_config<F>(lookup: F) -> Result<AnalysisConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let defaults = AnalysisConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_positive = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let raw = or_default(var, &default.to_string());
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(value)
    };

    // Only the single-run path uses this name, so it is validated there.
    let subreddit = or_default("THREADSCOPE_SUBREDDIT", &defaults.subreddit);

    let sort_order: SortOrder =
        or_default("THREADSCOPE_SORT_ORDER", &defaults.sort_order.to_string()).parse()?;
    let relevance_text: PostTextMode = or_default(
        "THREADSCOPE_RELEVANCE_TEXT",
        &defaults.relevance_text.to_string(),
    )
    .parse()?;

    let max_posts = parse_positive("THREADSCOPE_MAX_POSTS", defaults.max_posts)?;
    let max_comments = parse_positive("THREADSCOPE_MAX_COMMENTS", defaults.max_comments)?;
    let max_topics = parse_positive("THREADSCOPE_MAX_TOPICS", defaults.topic_model.max_topics)?;
    let min_topic_size = parse_positive(
        "THREADSCOPE_MIN_TOPIC_SIZE",
        defaults.topic_model.min_topic_size,
    )?;

    let results_dir = PathBuf::from(or_default("THREADSCOPE_RESULTS_DIR", "data/results"));
    let log_level = or_default("THREADSCOPE_LOG_LEVEL", &defaults.log_level);

    Ok(AnalysisConfig {
        subreddit,
        sort_order,
        max_posts,
        max_comments,
        results_dir,
        relevance_text,
        topic_model: TopicModelConfig {
            max_topics,
            min_topic_size,
        },
        log_level,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
