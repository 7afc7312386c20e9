use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Listing order the raw submissions were retrieved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Hot => write!(f, "hot"),
            SortOrder::New => write!(f, "new"),
            SortOrder::Top => write!(f, "top"),
            SortOrder::Rising => write!(f, "rising"),
            SortOrder::Controversial => write!(f, "controversial"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(SortOrder::Hot),
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            "rising" => Ok(SortOrder::Rising),
            "controversial" => Ok(SortOrder::Controversial),
            other => Err(ConfigError::InvalidEnvVar {
                var: "THREADSCOPE_SORT_ORDER".to_string(),
                reason: format!(
                    "unknown sort order '{other}'; expected hot, new, top, rising or controversial"
                ),
            }),
        }
    }
}

/// Which part of a post is compared against its comments for relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostTextMode {
    Title,
    Body,
    #[default]
    TitleBody,
}

impl std::fmt::Display for PostTextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostTextMode::Title => write!(f, "title"),
            PostTextMode::Body => write!(f, "body"),
            PostTextMode::TitleBody => write!(f, "title-body"),
        }
    }
}

impl FromStr for PostTextMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(PostTextMode::Title),
            "body" => Ok(PostTextMode::Body),
            "title-body" => Ok(PostTextMode::TitleBody),
            other => Err(ConfigError::InvalidEnvVar {
                var: "THREADSCOPE_RELEVANCE_TEXT".to_string(),
                reason: format!("unknown mode '{other}'; expected title, body or title-body"),
            }),
        }
    }
}

/// Tuning knobs for the built-in keyword topic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicModelConfig {
    /// Upper bound on discovered topics, outliers excluded.
    pub max_topics: usize,
    /// Clusters with fewer documents than this are folded into the outlier topic.
    pub min_topic_size: usize,
}

impl Default for TopicModelConfig {
    fn default() -> Self {
        Self {
            max_topics: 10,
            min_topic_size: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub subreddit: String,
    pub sort_order: SortOrder,
    pub max_posts: usize,
    pub max_comments: usize,
    pub results_dir: PathBuf,
    pub relevance_text: PostTextMode,
    pub topic_model: TopicModelConfig,
    pub log_level: String,
}

impl AnalysisConfig {
    /// Configuration for one subreddit with every other value at its default.
    #[must_use]
    pub fn for_subreddit(subreddit: &str, sort_order: SortOrder) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            sort_order,
            ..Self::default()
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            subreddit: "computerscience".to_string(),
            sort_order: SortOrder::Hot,
            max_posts: 500,
            max_comments: 500,
            results_dir: PathBuf::from("data/results"),
            relevance_text: PostTextMode::TitleBody,
            topic_model: TopicModelConfig::default(),
            log_level: "info".to_string(),
        }
    }
}
