//! Apartment watcher CLI
//!
//! Run once per invocation; schedule it with cron or a systemd timer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use watcher::{
    error::Result,
    models::{BOT_TOKEN_VAR, CHAT_ID_VAR, Config},
    pipeline::{self, RunOutcome, Watcher},
    services::{ListingCrawler, TelegramNotifier},
    storage::{ListingStore, LocalStore},
    utils::http,
};

/// apartment-watcher - New listing notifier
#[derive(Parser, Debug)]
#[command(
    name = "apartment-watcher",
    version,
    about = "Sends new apartment listings to Telegram"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "watcher.toml")]
    config: PathBuf,

    /// Override the seen-listing store path
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch targets and notify about new listings (default)
    Run,

    /// Validate configuration
    Validate,

    /// Show store and credential status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // A missing .env file is normal; real environment variables still apply.
    let _ = dotenvy::dotenv();
    init_logging(cli.verbose);

    let mut config = Config::load_if_exists(&cli.config).inspect_err(|e| {
        log::error!("Config load failed from {}: {}", cli.config.display(), e);
    })?;
    config.apply_env();
    if let Some(path) = cli.store {
        config.store.path = path;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            config.validate()?;

            let report = pipeline::run_watch(&config, |credentials| {
                let client = http::create_async_client(&config.crawler)?;
                Ok(Watcher::new(
                    ListingCrawler::new(&config, client.clone())?,
                    LocalStore::new(&config.store.path),
                    TelegramNotifier::new(
                        client,
                        &config.telegram,
                        credentials,
                        &config.notifications,
                    ),
                ))
            })
            .await?;

            if matches!(report.outcome, RunOutcome::MissingCredentials(_)) {
                return Ok(());
            }

            log::info!(
                "Run finished in {} ms: {} crawled, {} new, {} sent, {} failed, {} stored",
                report.elapsed().num_milliseconds(),
                report.crawled_count,
                report.new_count,
                report.sent_count,
                report.failed_count,
                report.stored_count
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} target(s), selectors compile)",
                config.targets.len()
            );
        }

        Command::Info => {
            let store = LocalStore::new(&config.store.path);
            log::info!("Store: {}", store.location());
            match store.load_checked().await {
                Ok(listings) => log::info!("Seen listings: {}", listings.len()),
                Err(e) => log::warn!("Store unreadable: {}", e),
            }

            for target in &config.targets {
                log::info!("Target: {}", target);
            }

            let present = |value: &Option<String>| {
                if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
                    "set"
                } else {
                    "missing"
                }
            };
            log::info!("{}: {}", CHAT_ID_VAR, present(&config.telegram.chat_id));
            log::info!("{}: {}", BOT_TOKEN_VAR, present(&config.telegram.bot_token));
        }
    }

    Ok(())
}
