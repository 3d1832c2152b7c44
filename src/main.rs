//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Telegram transport, SQLite record store
//! - Application: Subscription guard, Form flow, Router
//! - Interface: Command Handlers
//!
//! Then long-polls Telegram and feeds updates to the router one at a time.

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::router::CommandRouter;
use crate::application::state::BotState;
use crate::application::subscription::SubscriptionChecker;
use crate::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::infrastructure::store::RecordStore;
use crate::infrastructure::telegram::{TelegramApi, TelegramChat};
use crate::strings::logs;

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "intake-bot", about = "Subscription-gated intake form bot for Telegram")]
struct Cli {
    /// Path to the YAML config file (optional; environment variables override it)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load(&cli.config).context("Failed to load configuration")?;

    // 2. Logging Setup
    let data_dir = PathBuf::from(&config.system.data_dir);
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = data_dir.join("session.log");
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(&data_dir, "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("{}", logs::STARTUP);

    // 3. Initialize Infrastructure
    let store = Arc::new(
        RecordStore::open(&config.system.database_path).context("Failed to open record store")?,
    );
    let api = Arc::new(
        TelegramApi::new(
            &config.telegram.api_url,
            &config.telegram.token,
            config.telegram.poll_timeout,
        )
        .context("Failed to create Telegram client")?,
    );

    // 4. Initialize Application Components
    let checker = Arc::new(SubscriptionChecker::new(
        [
            config.channels.primary.clone(),
            config.channels.secondary.clone(),
        ],
        api.clone(),
    ));
    let state = Arc::new(Mutex::new(BotState::default()));
    let router = CommandRouter::new(store.clone(), checker, state);

    // 5. Startup Diagnostics
    tracing::info!(
        "{}",
        logs::startup_channels(&config.channels.primary, &config.channels.secondary)
    );
    let admin_known = store.get_user(config.system.admin_id)?.is_some();
    tracing::info!("{}", logs::startup_admin(config.system.admin_id, admin_known));
    tracing::info!(
        "{}",
        logs::startup_applications(store.count_applications()?)
    );

    // 6. Event Loop
    tokio::select! {
        _ = poll_loop(api, &router) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
            }
            tracing::info!("{}", logs::SHUTDOWN);
        }
    }

    Ok(())
}

/// Fetches updates forever, handling each one to completion before the next.
async fn poll_loop(api: Arc<TelegramApi>, router: &CommandRouter) {
    tracing::info!("{}", logs::POLL_LOOP_START);
    let mut offset = 0;

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("{}", logs::poll_failed(&e.to_string()));
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(incoming) = update.into_incoming() else {
                continue;
            };

            let chat = TelegramChat::new(api.clone(), incoming.chat_id);
            if let Err(e) = router.route(&chat, &incoming).await {
                tracing::error!(
                    "{}",
                    logs::route_failed(incoming.sender.id, &format!("{e:#}"))
                );
            }
        }
    }
}
