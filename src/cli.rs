//! CLI definitions for kbsearch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// kbsearch CLI.
#[derive(Parser)]
#[command(name = "kbsearch")]
#[command(about = "Hybrid knowledge base search with Reciprocal Rank Fusion")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a single query and print the results
    Search {
        /// Query text
        query: String,

        /// Number of results (default: search.default_match_count)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Search type: hybrid, semantic or text
        #[arg(short = 't', long = "type")]
        search_type: Option<String>,

        /// Print the transcript handed to the agent instead of the detailed listing
        #[arg(long)]
        transcript: bool,
    },

    /// Interactive query loop
    Interactive {
        /// Initial number of results
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Initial search type
        #[arg(short = 't', long = "type")]
        search_type: Option<String>,
    },

    /// Load documents from a JSON Lines file into the store
    Ingest {
        /// One document per line: {"title", "source", "chunks": [...]}
        file: PathBuf,

        /// Chunks embedded per request
        #[arg(long, default_value_t = 32)]
        batch_size: usize,
    },
}
