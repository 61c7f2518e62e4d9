//! kbsearch - hybrid knowledge base search.
//!
//! Entry point for the evaluation and ingestion CLI.

mod cli;
mod cmd_ingest;
mod cmd_search;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use kbsearch_config::{ConfigLoader, ConfigValidator, LoggingConfig};
use kbsearch_embedding::build_embedder;
use kbsearch_search_hybrid::{KnowledgeBase, SearchServices};
use kbsearch_store_sqlite::SqliteKnowledgeStore;

use crate::cli::{Cli, Commands};
use crate::cmd_ingest::handle_ingest;
use crate::cmd_search::{handle_interactive, handle_search};

/// Initialize tracing with console output and, when `logging.dir` is set,
/// a daily rolling log file.
///
/// `RUST_LOG` overrides `logging.level`. The returned guard flushes the
/// file writer and must live until exit.
fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Console output goes to stderr so result listings stay pipeable.
    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .boxed();

    let (file, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("kbsearch")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let _guard = init_tracing(&config.logging)?;

    for warning in ConfigValidator::require_valid(&config)? {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }

    let store = Arc::new(
        SqliteKnowledgeStore::open(&config.store.path)
            .await
            .with_context(|| format!("Failed to open store at {}", config.store.path.display()))?,
    );
    let embedder = build_embedder(&config.embedding)?;
    info!(
        "Using store {} with {} embeddings",
        config.store.path.display(),
        config.embedding.provider
    );

    match cli.command {
        Commands::Search {
            query,
            count,
            search_type,
            transcript,
        } => {
            let kb = KnowledgeBase::new(
                SearchServices::from_store(embedder, store),
                config.search.clone(),
            );
            handle_search(&kb, &query, count, search_type, transcript).await
        }
        Commands::Interactive { count, search_type } => {
            let kb = KnowledgeBase::new(
                SearchServices::from_store(embedder, store),
                config.search.clone(),
            );
            handle_interactive(&kb, count, search_type).await
        }
        Commands::Ingest { file, batch_size } => {
            handle_ingest(&store, embedder.as_ref(), &file, batch_size).await
        }
    }
}
