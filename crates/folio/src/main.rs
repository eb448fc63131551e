//! folio — the portfolio site daemon.
//!
//! Single binary that assembles:
//! - Content store (redb)
//! - Content API + server-rendered site
//! - A command-line editing session against a running site
//!
//! # Usage
//!
//! ```text
//! folio serve --config folio.toml --port 8080 --data-dir /var/lib/folio
//! folio content --url http://localhost:8080 set hero.title "Hello"
//! folio stats --data-dir /var/lib/folio
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_admin::{AdminContext, ContentSource, CookieJar, FileCache, HttpRemote};
use folio_core::{FolioConfig, UnlockGesture};
use folio_state::ContentStore;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio", about = "Portfolio site daemon")]
struct Cli {
    /// Path to the TOML config file. Defaults apply when it is absent.
    #[arg(long, global = true, default_value = "folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site and content API.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for persistent state (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Edit overrides on a running site.
    Content {
        /// Site origin.
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,

        #[command(subcommand)]
        action: ContentAction,
    },

    /// Print visit counts from the local store.
    Stats {
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Also list this many of the most recent visits.
        #[arg(long, default_value = "0")]
        recent: usize,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand)]
enum ContentAction {
    /// Print the full override map.
    Dump,
    /// Print one override, or the fallback if unset.
    Get {
        key: String,
        #[arg(long, default_value = "")]
        fallback: String,
    },
    /// Set one override.
    Set { key: String, value: String },
    /// Remove one override.
    Delete { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,folio=debug")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    match cli.command {
        Command::Serve { port, data_dir } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            run_serve(config).await
        }
        Command::Content { url, action } => run_content(config, &url, action).await,
        Command::Stats { data_dir, recent } => {
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            run_stats(&config, recent)
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Read the config file, or use defaults if it does not exist.
fn load_config(path: &Path) -> anyhow::Result<FolioConfig> {
    if !path.exists() {
        info!(path = ?path, "no config file, using defaults");
        return Ok(FolioConfig::default());
    }
    let config = FolioConfig::from_file(path)?;
    info!(path = ?path, "config loaded");
    Ok(config)
}

/// Open the store, degrading to "no persistence" if that fails.
fn open_store(config: &FolioConfig) -> Option<ContentStore> {
    if let Err(e) = std::fs::create_dir_all(&config.server.data_dir) {
        warn!(error = %e, dir = ?config.server.data_dir, "cannot create data directory, running without storage");
        return None;
    }
    let db_path = config.db_path();
    match ContentStore::open(&db_path) {
        Ok(store) => {
            info!(path = ?db_path, "content store opened");
            Some(store)
        }
        Err(e) => {
            warn!(error = %e, path = ?db_path, "content store unavailable, serving defaults");
            None
        }
    }
}

async fn run_serve(config: FolioConfig) -> anyhow::Result<()> {
    info!("folio starting");

    let store = open_store(&config);
    let router = folio_api::build_router(store, &config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("folio stopped");
    Ok(())
}

/// One editing session: the CLI holds the unlock cookie for a chord-length
/// session and talks to the site's content API.
async fn run_content(config: FolioConfig, url: &str, action: ContentAction) -> anyhow::Result<()> {
    let jar = CookieJar::new(&config.admin.cookie_name);
    jar.unlock(UnlockGesture::KeyboardChord.ttl(&config.unlock));

    let remote = HttpRemote::new(url, jar.clone())?;
    let cache = FileCache::new(config.server.data_dir.join(&config.admin.cache_file));
    let ctx = AdminContext::new(
        Arc::new(cache),
        Arc::new(remote),
        Arc::new(jar),
        config.admin.poll_interval(),
    );
    ctx.mount();
    ctx.wait_synced().await;

    let result = match action {
        ContentAction::Dump => {
            let overrides = ctx.session().overrides;
            println!("{}", serde_json::to_string_pretty(&overrides)?);
            Ok(())
        }
        ContentAction::Get { key, fallback } => {
            println!("{}", ctx.get_content(&key, &fallback));
            Ok(())
        }
        ContentAction::Set { key, value } => ctx
            .set_content(&key, &value)
            .await
            .with_context(|| format!("failed to set {key}")),
        ContentAction::Delete { key } => ctx
            .delete_content(&key)
            .await
            .with_context(|| format!("failed to delete {key}")),
    };

    ctx.unmount();
    result
}

fn run_stats(config: &FolioConfig, recent: usize) -> anyhow::Result<()> {
    let store = ContentStore::open(&config.db_path())
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;

    for count in store.visit_counts()? {
        println!("{:>8}  {}", count.visits, count.path);
    }
    if recent > 0 {
        println!();
        for visit in store.recent_visits(recent)? {
            println!(
                "{}  {}  {}",
                visit.at,
                visit.path,
                visit.referrer.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}
