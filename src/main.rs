use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stridelog::infrastructure::{
    AppConfig, CacheCoordinator, CacheEventBus, DiskImageCache, HttpImageFetcher, HttpObjectStore,
    LogLevel, MemoryImageCache,
};

/// Cache inspection harness for the Stridelog image pipeline.
#[derive(Debug, Parser)]
#[command(name = stridelog::NAME, version = stridelog::VERSION)]
struct Cli {
    /// Configuration file path.
    #[arg(long, env = "STRIDELOG_CONFIG")]
    config: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Loads an image URL through the cache pipeline.
    Fetch {
        /// Image URL to load.
        url: String,
        /// Bypass the memory cache and refetch.
        #[arg(long)]
        force: bool,
    },
    /// Checks whether an image URL exists (HTTP HEAD).
    Verify {
        /// Image URL to check.
        url: String,
    },
    /// Clears both cache tiers.
    Clear,
    /// Prints memory tier statistics.
    Stats,
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

async fn build_coordinator(config: &AppConfig) -> Result<CacheCoordinator> {
    let memory = Arc::new(MemoryImageCache::new(config.cache.memory_capacity));
    let disk = Arc::new(
        DiskImageCache::new(
            config.cache.effective_disk_dir(),
            config.cache.disk_max_bytes,
        )
        .await?,
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.cache.timeout_secs))
        .build()?;
    let fetcher = Arc::new(HttpImageFetcher::with_client(client.clone()));
    let storage = Arc::new(HttpObjectStore::new(
        client,
        config.storage.endpoint.clone(),
        config.storage.public_base.clone(),
    ));

    Ok(CacheCoordinator::new(
        memory,
        disk,
        fetcher,
        storage,
        CacheEventBus::default(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    init_logging(&config)?;

    info!(version = stridelog::VERSION, "Starting Stridelog cache tool");

    let coordinator = build_coordinator(&config).await?;

    match cli.command {
        Command::Fetch { url, force } => {
            let loaded = coordinator.load(&url, force).await?;
            println!(
                "{}x{} via {}",
                loaded.image.width(),
                loaded.image.height(),
                loaded.source
            );
        }
        Command::Verify { url } => {
            let exists = coordinator.verify(&url).await;
            println!("{}", if exists { "exists" } else { "missing" });
        }
        Command::Clear => {
            coordinator.clear_all().await;
            println!("caches cleared");
        }
        Command::Stats => {
            println!("{}", coordinator.memory_stats());
        }
    }

    Ok(())
}
