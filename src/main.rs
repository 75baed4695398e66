//! # Docent CLI (`docent`)
//!
//! ## Usage
//!
//! ```bash
//! docent --config ./config/docent.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docent ask "<question>"` | Load documents and answer one question |
//! | `docent search "<question>"` | Show the fragments a question retrieves |
//! | `docent chunk <file>` | Show how a file is split into fragments |
//! | `docent serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! docent ask "What are dogs?" --file notes/animals.txt
//! docent search "kubernetes rollout" --dir ./docs --limit 3
//! docent serve --config ./config/docent.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docent::{cli, config, server};

/// Docent: answers questions from your own documents, with citations.
#[derive(Parser)]
#[command(
    name = "docent",
    about = "Docent: a document-grounded research assistant",
    version,
    long_about = "Docent loads plain text, Markdown, and PDF documents, splits them into \
    paragraph fragments, retrieves the fragments that best match a question by keyword \
    overlap, and asks a hosted model to answer from those fragments only."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docent.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/docent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load documents and answer a single question.
    ///
    /// Requires `GEMINI_API_KEY` unless `[synthesizer] provider = "disabled"`.
    Ask {
        /// The question to answer.
        question: String,

        /// Document to load (repeatable).
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// Directory to scan for documents (see `[sources]` globs).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show which fragments a question retrieves, with scores.
    ///
    /// Runs retrieval only; the model is never contacted.
    Search {
        /// The question to match.
        question: String,

        /// Document to load (repeatable).
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// Directory to scan for documents.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Maximum number of fragments (defaults to `[retrieval].top_k`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the fragments a file is split into.
    Chunk {
        /// File to chunk.
        file: PathBuf,
    },

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_tracing(match args.command {
        Commands::Serve => "docent=info",
        _ => "docent=warn",
    });

    let cfg = config::load_config_or_default(&args.config)?;

    match args.command {
        Commands::Ask {
            question,
            files,
            dir,
        } => {
            let sources = cli::collect_sources(&cfg, &files, dir.as_deref())?;
            cli::run_ask(&cfg, &question, sources).await?;
        }
        Commands::Search {
            question,
            files,
            dir,
            limit,
        } => {
            let sources = cli::collect_sources(&cfg, &files, dir.as_deref())?;
            cli::run_search(&cfg, &question, sources, limit).await?;
        }
        Commands::Chunk { file } => {
            cli::run_chunk(&file).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
