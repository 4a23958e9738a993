//! MEMVEX CLI
//!
//! Command-line glue over the memory façade: remember text with metadata,
//! recall by similarity, inspect the store. Uses the built-in hashed
//! embedder; a real model plugs in through the library's `Embedder` trait.

use clap::{Parser, Subcommand};
use memvex::{HashEmbedder, Memory, Metadata, StoreConfig, VectorStore};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// MEMVEX - Durable Vector Memory
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the snapshot artifacts
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Embedding dimension
    #[arg(long, default_value_t = 384)]
    dimension: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed and store a text, then persist
    Remember {
        /// Text to remember
        text: String,

        /// Metadata entries as KEY=VALUE (repeatable)
        #[arg(short, long = "meta")]
        meta: Vec<String>,
    },
    /// Embed a query and print the top matches as JSON lines
    Recall {
        /// Query text
        query: String,

        /// Number of results
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
    /// Print store statistics
    Stats,
}

fn parse_meta(pairs: &[String]) -> anyhow::Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("metadata must be KEY=VALUE, got '{pair}'");
        };
        metadata.insert(
            key.to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }
    Ok(metadata)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("memvex=info".parse()?))
        .init();

    let args = Args::parse();

    let config = StoreConfig::default()
        .with_dimension(args.dimension)
        .with_dir(&args.data_dir);
    let store = VectorStore::open(config)?;

    match args.command {
        Command::Remember { text, meta } => {
            let metadata = parse_meta(&meta)?;
            let memory = Memory::new(HashEmbedder::new(args.dimension), store)?;
            let slot = memory.remember(&text, metadata)?;
            println!("remembered at slot {slot}");
        }
        Command::Recall { query, k } => {
            let memory = Memory::new(HashEmbedder::new(args.dimension), store)?;
            for hit in memory.recall(&query, k)? {
                println!("{}", serde_json::to_string(&hit)?);
            }
        }
        Command::Stats => {
            println!("records:   {}", store.len());
            println!("dimension: {}", store.dimension());
        }
    }

    Ok(())
}
