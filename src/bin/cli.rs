//! newswire CLI
//!
//! Fetches articles from the configured news providers into the local
//! store. Credentials come from the environment (or a `.env` file).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use newswire::{
    config,
    error::Result,
    models::Config,
    pipeline::{self, FetchDeps},
    storage::{ArticleStore, CategoryProvider, LocalStore, SourceRegistry},
};

/// newswire - news aggregation pipeline
#[derive(Parser, Debug)]
#[command(name = "newswire", version, about = "Multi-provider news aggregator")]
struct Cli {
    /// Path to the data directory holding the store and config
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch articles from active sources
    Fetch {
        /// Fetch from a single source slug only
        #[arg(long)]
        source: Option<String>,
    },

    /// List registered sources and their state
    Sources,

    /// Validate configuration and credentials
    Validate,

    /// Show store contents summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(data_dir: &std::path::Path) -> Config {
    let mut config = config::load_or_default(data_dir.join("config.toml"));
    config::overlay_env(&mut config);
    config
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    // Pull credentials from a .env file when present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.data_dir);
    let store = Arc::new(LocalStore::open(&cli.data_dir).await?);

    match cli.command {
        Command::Fetch { source } => {
            config.validate()?;

            let deps = FetchDeps {
                articles: Arc::clone(&store) as Arc<dyn ArticleStore>,
                registry: Arc::clone(&store) as Arc<dyn SourceRegistry>,
                categories: Arc::clone(&store) as Arc<dyn CategoryProvider>,
            };

            let summary = pipeline::run_fetch(&config, &deps, source.as_deref()).await?;

            for outcome in &summary.outcomes {
                match &outcome.result {
                    Ok(count) => log::info!("{}: {count} new article(s)", outcome.source_name),
                    Err(e) => log::error!("{}: failed ({e})", outcome.source_name),
                }
            }
            log::info!(
                "Done: {} new article(s), {} failure(s)",
                summary.new_total(),
                summary.failure_count()
            );
        }

        Command::Sources => {
            let sources = store.active_sources().await?;
            log::info!("{} active source(s):", sources.len());
            for source in sources {
                let fetched = source
                    .last_fetched_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".into());
                log::info!("  {} ({}) last fetched: {fetched}", source.name, source.slug);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK");

            let checks = [
                ("NewsAPI", config.providers.newsapi.key().is_some()),
                ("Guardian", config.providers.guardian.key().is_some()),
                ("NY Times", config.providers.nytimes.key().is_some()),
            ];
            for (name, present) in checks {
                if present {
                    log::info!("✓ {name} key configured");
                } else {
                    log::warn!("✗ {name} key missing; its fetch cycles will fail");
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());
            log::info!("Articles stored: {}", store.article_count().await?);

            let sources = store.active_sources().await?;
            log::info!("Active sources: {}", sources.len());

            let categories = store.all_categories().await?;
            log::info!("Categories: {}", categories.len());
        }
    }

    Ok(())
}
