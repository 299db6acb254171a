//! # Postdeck CLI (`postdeck`)
//!
//! Browse a post corpus from the terminal or serve it over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! postdeck [--config ./config/postdeck.toml] [--corpus <path-or-url>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `postdeck list` | List posts matching title, author and facet filters |
//! | `postdeck tags` | List every facet value present in the corpus |
//! | `postdeck show <index>` | Render one post's content blocks |
//! | `postdeck serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Posts mentioning "prompt" written with either model
//! postdeck --corpus posts.jsonl list --title prompt --model gpt_4 --model claude
//!
//! # Everything tagged with an assignment, as JSON
//! postdeck --corpus posts.jsonl list --assignment homework_2 --json
//!
//! # Read the fourth post
//! postdeck --corpus posts.jsonl show 3
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use postdeck::config;
use postdeck::list::{self, FilterInput};
use postdeck::{logging, server, show, tags};

/// Postdeck CLI: browse, filter, and read a corpus of authored posts.
#[derive(Parser)]
#[command(
    name = "postdeck",
    about = "Postdeck: browse, facet-filter, and read a corpus of authored posts",
    version,
    long_about = "Postdeck loads a corpus of posts (line-delimited JSON or a single JSON value) \
    from a file or URL, filters it by title, author, model, topic and assignment, and renders \
    individual posts with their images, links and files laid out in reading order."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional when `--corpus` is given.
    #[arg(long, global = true, default_value = "./config/postdeck.toml")]
    config: PathBuf,

    /// Corpus file path or http(s) URL. Overrides `[corpus].source`.
    #[arg(long, global = true)]
    corpus: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List posts matching the given filters.
    ///
    /// Text filters are case-insensitive substring matches. Facet filters
    /// may be repeated: values within one facet are OR-ed, and different
    /// facets are AND-ed.
    List {
        /// Only posts whose title contains this text.
        #[arg(long)]
        title: Option<String>,

        /// Only posts whose author name contains this text.
        #[arg(long)]
        author: Option<String>,

        /// Model id (repeatable).
        #[arg(long = "model")]
        models: Vec<String>,

        /// Topic id (repeatable).
        #[arg(long = "topic")]
        topics: Vec<String>,

        /// Assignment id (repeatable).
        #[arg(long = "assignment")]
        assignments: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List all facet values present in the corpus.
    Tags {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Render a single post by its corpus index.
    Show {
        /// Zero-based position of the post in the corpus.
        index: usize,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Start the JSON HTTP API.
    ///
    /// Binds to `[server].bind`.
    Serve,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::resolve_config(&cli.config, cli.corpus.as_deref())?;

    match cli.command {
        Commands::List {
            title,
            author,
            models,
            topics,
            assignments,
            json,
        } => {
            let input = FilterInput {
                title,
                author,
                models,
                topics,
                assignments,
            };
            list::run_list(&cfg, &input, json).await?;
        }
        Commands::Tags { json } => {
            tags::run_tags(&cfg, json).await?;
        }
        Commands::Show { index, json } => {
            show::run_show(&cfg, index, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
