mod analyze;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeArgs;

#[derive(Debug, Parser)]
#[command(name = "threadscope")]
#[command(about = "Topic, sentiment and relevance analysis of subreddit threads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one subreddit sample and export the result table
    Analyze(AnalyzeArgs),
    /// Analyze every run listed in a YAML batch file
    Batch {
        /// Path to the batch file
        #[arg(long)]
        config: PathBuf,
    },
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = threadscope_core::load_analysis_config_from_env()?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Analyze(args) => analyze::run_analyze(config, args).await,
        Commands::Batch { config: path } => analyze::run_batch(config, &path).await,
    }
}
