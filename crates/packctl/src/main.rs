//! `packctl`: publish and manage content packs.
//!
//! Binary entrypoint that opens a record store, builds a [`PackNode`] over
//! it and runs one operation.
//!
//! # Usage
//!
//! ```text
//! packctl publish --folder ./assets                 # publish, version = now
//! packctl publish --folder ./assets --version 12 --url https://cdn.example.com/a
//! packctl list -n 20                                # newest first
//! packctl delete <pack-id>                          # delete + recompute pointer
//! packctl latest                                    # show the bootstrap pointer
//! packctl assets <pack-id> --out ./extracted        # asset detail
//! packctl link                                      # bootstrap deep link
//! packctl reconcile                                 # repair the pointer
//! ```

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packpoint_engine::{PackNode, PackService, PublishRequest};
use packpoint_meta::FjallStore;
use packpoint_store::{MemoryStore, RecordStore};
use packpoint_types::{PointerState, RecordId};
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "packctl",
    version,
    about = "Publish versioned content packs and manage the bootstrap pointer"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory of the fjall store.
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a throwaway in-memory store (nothing is persisted).
    #[arg(short, long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a new pack and point the bootstrap record at it.
    Publish {
        /// Folder whose direct, non-hidden files become assets.
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Additional file to include. Can be specified multiple times.
        #[arg(long)]
        file: Vec<PathBuf>,

        /// Pack version. Defaults to the current unix time in seconds.
        #[arg(short, long)]
        version: Option<i64>,

        /// Custom URL to attach. Only the first five are kept.
        #[arg(short, long)]
        url: Vec<String>,
    },

    /// List published packs, highest version first.
    List {
        /// Maximum number of packs to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete a pack and move the pointer to the newest remaining one.
    Delete {
        /// Identity of the pack to delete.
        id: String,
    },

    /// Show the pack the bootstrap record currently references.
    Latest,

    /// Show the assets of a pack.
    Assets {
        /// Identity of the pack.
        id: String,

        /// Write each asset payload into this directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the bootstrap deep link.
    Link,

    /// Recompute the pointer from the current history.
    Reconcile,
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }
    if cli.memory {
        config.store.backend = "memory".to_string();
    }

    let store = open_store(&config)?;
    let node = PackNode::new(config.node_config(), store);

    match cli.command {
        Commands::Publish {
            folder,
            file,
            version,
            url,
        } => cmd_publish(&node, folder, file, version, url).await,
        Commands::List { limit, json } => {
            cmd_list(&node, limit.unwrap_or(config.history.limit), json).await
        }
        Commands::Delete { id } => cmd_delete(&node, RecordId::new(id)).await,
        Commands::Latest => cmd_latest(&node).await,
        Commands::Assets { id, out } => cmd_assets(&node, RecordId::new(id), out.as_deref()).await,
        Commands::Link => {
            println!("{}", node.bootstrap_link());
            Ok(())
        }
        Commands::Reconcile => cmd_reconcile(&node, config.history.limit).await,
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &CliConfig) -> Result<Arc<dyn RecordStore>> {
    if config.memory_mode() {
        info!("using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = config.store.data_dir.join("records");
    std::fs::create_dir_all(&path).context("failed to create data directory")?;
    debug!(path = %path.display(), "opening fjall store");
    let store = FjallStore::open(&path)
        .with_context(|| format!("cannot open record store at {}", path.display()))?;
    Ok(Arc::new(store))
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

async fn cmd_publish(
    node: &dyn PackService,
    folder: Option<PathBuf>,
    files: Vec<PathBuf>,
    version: Option<i64>,
    urls: Vec<String>,
) -> Result<()> {
    let version = version.unwrap_or_else(|| packpoint_store::now_secs() as i64);
    let request = PublishRequest {
        folder,
        extra_files: files,
        version,
        custom_urls: urls,
    };

    let receipt = node.publish(request).await?;
    println!(
        "Published pack {} (version {}, {} assets)",
        receipt.pack_id, receipt.version, receipt.asset_count
    );
    println!("Bootstrap now points at {}", receipt.pack_id);
    Ok(())
}

async fn cmd_list(node: &dyn PackService, limit: usize, json: bool) -> Result<()> {
    let packs = node.list_packs(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&packs)?);
        return Ok(());
    }

    if packs.is_empty() {
        println!("No packs published.");
        return Ok(());
    }
    let latest = node.resolve_latest().await?;
    println!("{:<2} {:>12} {:>12} {:>7}  ID", "", "VERSION", "CREATED", "ASSETS");
    for pack in &packs {
        let marker = if latest.as_ref() == Some(&pack.id) { "*" } else { "" };
        println!(
            "{marker:<2} {:>12} {:>12} {:>7}  {}",
            pack.version, pack.created_at, pack.asset_count, pack.id
        );
    }
    Ok(())
}

async fn cmd_delete(node: &dyn PackService, id: RecordId) -> Result<()> {
    let outcome = node
        .delete_pack(&id)
        .await
        .with_context(|| format!("failed to delete pack {id}"))?;
    println!("Deleted pack {id}");
    print_pointer(&outcome.pointer);
    Ok(())
}

async fn cmd_latest(node: &dyn PackService) -> Result<()> {
    let state = node.pointer_state().await?;
    print_pointer(&state);
    if let Some(id) = &state.latest {
        let urls = node.custom_urls(id).await.unwrap_or_default();
        for url in urls {
            println!("  url: {url}");
        }
    }
    Ok(())
}

async fn cmd_assets(node: &dyn PackService, id: RecordId, out: Option<&Path>) -> Result<()> {
    let assets = node.pack_assets(&id).await?;
    let urls = node.custom_urls(&id).await?;

    println!("Pack {id}: {} assets", assets.len());
    for asset in &assets {
        let size = asset.payload.as_ref().map_or(0, |p| p.len());
        println!(
            "  {:<40} {:<32} {:>10}  {}",
            asset.filename,
            asset.key,
            size,
            asset.sha256.as_deref().unwrap_or("-")
        );
    }
    for url in &urls {
        println!("  url: {url}");
    }

    if let Some(dir) = out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for asset in &assets {
            let Some(payload) = &asset.payload else {
                continue;
            };
            // Keys are unique within a pack; display names may collide.
            let path = dir.join(&asset.key);
            std::fs::write(&path, payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        println!("Extracted payloads to {}", dir.display());
    }
    Ok(())
}

async fn cmd_reconcile(node: &dyn PackService, history_limit: usize) -> Result<()> {
    let outcome = node.reconcile().await?;
    println!("{}", reconcile_summary(outcome.history.len(), history_limit));
    print_pointer(&outcome.pointer);
    Ok(())
}

/// The reconcile history is capped, so a full page means older packs were not listed.
fn reconcile_summary(listed: usize, history_limit: usize) -> String {
    let mut line = format!("Reconciled from the {listed} newest packs listed");
    if listed >= history_limit {
        line.push_str(" (history limit reached, older packs not counted)");
    }
    line
}

fn print_pointer(state: &PointerState) {
    match &state.latest {
        Some(id) => println!("Bootstrap points at {id} (version {})", state.version),
        None => println!("Bootstrap is cleared (version {})", state.version),
    }
}
