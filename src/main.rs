//! archive-tree main entry point
//!
//! This is the command-line interface over the archive service. Every command
//! prints pretty JSON to stdout; logs go to stderr.

use anyhow::{Context, Result};
use archive_tree::cache::open_cache;
use archive_tree::config::{load_config_with_hash, Config};
use archive_tree::sources::series_catalog;
use archive_tree::Archive;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// archive-tree: browse Korean classical-text archives as a tree
///
/// Lists collections, walks volumes down to their text leaves and extracts
/// leaf documents as plain text, caching every remote page.
#[derive(Parser, Debug)]
#[command(name = "archive-tree")]
#[command(version)]
#[command(about = "Browse Korean classical-text archives as a tree", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ITKC series catalog
    Series,

    /// List the children of one node
    List {
        /// Source id: itkc-bt, itkc-mo or sillok
        source: String,
        /// Node id (for ITKC, the series id lists its collections)
        node: String,
    },

    /// Enumerate every leaf below a node, breadth first
    Leaves {
        source: String,
        root: String,

        /// Also fetch each leaf's document
        #[arg(long)]
        resolve: bool,
    },

    /// Fetch one leaf document
    Text { source: String, leaf: String },
}

#[derive(Serialize)]
struct ResolvedLeaf<'a> {
    node: &'a archive_tree::Node,
    document: &'a archive_tree::LeafDocument,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    match &cli.command {
        Command::Series => print_json(&series_catalog()),
        Command::List { source, node } => {
            let archive = open_archive(source, &config)?;
            let page = archive
                .list_children(node)
                .await
                .with_context(|| format!("Failed to list {} in {}", node, source))?;
            print_json(&page)
        }
        Command::Leaves {
            source,
            root,
            resolve,
        } => {
            let archive = open_archive(source, &config)?;
            let leaves = archive
                .enumerate_leaves(root)
                .await
                .with_context(|| format!("Failed to enumerate leaves below {}", root))?;

            if *resolve {
                let resolved = archive
                    .resolve_leaves(&leaves)
                    .await
                    .context("Failed to resolve leaf documents")?;
                let out: Vec<ResolvedLeaf<'_>> = resolved
                    .iter()
                    .map(|(node, document)| ResolvedLeaf { node, document })
                    .collect();
                print_json(&out)
            } else {
                print_json(&leaves)
            }
        }
        Command::Text { source, leaf } => {
            let archive = open_archive(source, &config)?;
            let document = archive
                .fetch_leaf(leaf)
                .await
                .with_context(|| format!("Failed to fetch leaf {}", leaf))?;
            print_json(&document)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("archive_tree=info,warn"),
            1 => EnvFilter::new("archive_tree=debug,info"),
            2 => EnvFilter::new("archive_tree=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_archive(source: &str, config: &Config) -> Result<Archive> {
    let cache = open_cache(&config.cache).context("Failed to open cache")?;
    Archive::open(source, config, Arc::new(cache))
        .with_context(|| format!("Failed to open source {}", source))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
