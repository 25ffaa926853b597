//! CaskKV CLI
//!
//! Command-line interface for a CaskKV data file.

use std::path::{Path, PathBuf};
use std::process;

use caskkv::datafile::Recovery;
use caskkv::{Config, Engine, Result, Store, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// CaskKV CLI
#[derive(Parser, Debug)]
#[command(name = "caskkv-cli")]
#[command(about = "CLI for the CaskKV log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data file path
    #[arg(short, long, default_value = "./caskkv.db")]
    db: PathBuf,

    /// fsync after every N writes instead of after each write
    #[arg(long)]
    sync_every: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the data file and report whether it recovers cleanly
    Verify,

    #[command(flatten)]
    Store(StoreCommands),
}

/// Commands that run against an open engine
#[derive(Subcommand, Debug)]
enum StoreCommands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// List all live keys
    Keys,

    /// Show live and dead space in the data file
    Stats,

    /// Run the books.db walkthrough against the data file
    Demo,
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,caskkv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let sync_strategy = match args.sync_every {
        Some(count) => SyncStrategy::EveryNWrites { count },
        None => SyncStrategy::EveryWrite,
    };
    let config = Config::builder()
        .path(&args.db)
        .sync_strategy(sync_strategy)
        .build();

    match args.command {
        // Verify must not create the file or take ownership of it
        Commands::Verify => verify(&config.path),
        Commands::Store(command) => {
            let engine = Engine::open(config)?;
            execute(&engine, command)?;
            engine.close()
        }
    }
}

fn execute(engine: &Engine, command: StoreCommands) -> Result<()> {
    match command {
        StoreCommands::Get { key } => match engine.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        StoreCommands::Set { key, value } => {
            engine.set(&key, &value)?;
            println!("OK");
        }
        StoreCommands::Keys => {
            for key in engine.keys() {
                println!("{}", key);
            }
        }
        StoreCommands::Stats => {
            let stats = engine.stats();
            println!("keys:       {}", stats.keys);
            println!("file size:  {}", stats.file_size);
            println!("live bytes: {}", stats.live_bytes);
            println!("dead bytes: {}", stats.dead_bytes);
        }
        StoreCommands::Demo => demo(engine)?,
    }
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let result = Recovery::verify(path)?;
    println!(
        "ok: {} records, {} keys, {} bytes",
        result.records_replayed, result.keys_loaded, result.bytes_scanned
    );
    Ok(())
}

fn demo(store: &impl Store) -> Result<()> {
    for (key, value) in [("othello", "shakespeare"), ("war and peace", "tolstoy")] {
        store.set(key, value)?;
        let read = store.get(key)?;
        println!("value read {}", read.as_deref().unwrap_or("(not found)"));
    }
    Ok(())
}
