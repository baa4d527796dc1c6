// In app/src/main.rs

use anyhow::Result;
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::{Engine, Scanner, StateStore};
use notifier::{Notifier, TelegramNotifier};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use web_server::AppState;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Scans Binance candles for EMA crossovers and reports them to Telegram.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the scheduler and the status web server until terminated.
    Run,

    /// Runs a single scan cycle, prints its report and exits.
    Scan,

    /// Sends one message through the configured notifier.
    Notify {
        /// The message text.
        #[arg(short, long)]
        text: String,
    },
}

/// Everything the scanner and the web server share.
struct Components {
    scanner: Arc<Scanner>,
    notifier: Arc<dyn Notifier>,
    store: StateStore,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings()?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, "Starting EMA crossover bot");
    if settings.telegram.credentials().is_none() {
        tracing::error!("Telegram bot token or chat id is not set (TOKEN / CHAT_ID). Notifications will be skipped.");
    }

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Run => {
            run_app(settings).await?;
        }
        Commands::Scan => {
            handle_scan(settings).await?;
        }
        Commands::Notify { text } => {
            handle_notify(settings, text).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

/// Builds the collaborators, the state store and the scanner from configuration.
fn build_components(settings: &Settings) -> Result<Components> {
    let universe = app_config::load_universe()?;
    tracing::info!(
        instruments = universe.instruments.len(),
        timeframes = universe.timeframes.len(),
        "Scan universe loaded."
    );

    let api_client = Arc::new(api_client::new(&settings.binance)?);
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&settings.telegram)?);
    let store = StateStore::new();

    let scanner = Arc::new(Scanner::new(
        universe,
        api_client,
        notifier.clone(),
        store.clone(),
        Duration::from_secs(settings.scheduler.io_timeout_secs),
    ));

    Ok(Components {
        scanner,
        notifier,
        store,
    })
}

// --- "Run" Subcommand Logic ---

/// The primary logic for the `run` command.
/// Starts the scan scheduler and the web server; runs until one of them stops.
async fn run_app(settings: Settings) -> Result<()> {
    let Components {
        scanner,
        notifier,
        store,
    } = build_components(&settings)?;

    let engine = Engine::new(scanner, settings.scheduler.clone());
    let app_state = AppState { notifier, store };

    tracing::info!("Launching concurrent scan scheduler and web server tasks...");

    let engine_handle = tokio::spawn(async move { engine.run().await });
    let server_handle = tokio::spawn(async move { web_server::run(settings.server, app_state).await });

    // In a healthy state, neither should complete. If one does, it's likely an error.
    tokio::select! {
        engine_result = engine_handle => {
            tracing::error!(?engine_result, "Scan scheduler task has terminated unexpectedly.");
        }
        server_result = server_handle => {
            tracing::error!(?server_result, "Web server task has terminated unexpectedly.");
        }
    }

    anyhow::bail!("A critical task terminated. Shutting down.");
}

/// Handles the logic for the `scan` subcommand.
async fn handle_scan(settings: Settings) -> Result<()> {
    let Components { scanner, store, .. } = build_components(&settings)?;

    let report = scanner.run_scan_cycle().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    for (key, direction) in store.snapshot() {
        println!("  {key}: {direction}");
    }
    Ok(())
}

/// Handles the logic for the `notify` subcommand.
async fn handle_notify(settings: Settings, text: String) -> Result<()> {
    let notifier = TelegramNotifier::new(&settings.telegram)?;
    notifier.send_message(&text).await?;
    tracing::info!("Message sent.");
    Ok(())
}
