mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use card_ledger::server::{self, AppState};
use card_ledger::{AccountStore, BankingCore};
use commands::{Args, Parser};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = args.config();

    // 1. Seed the account store
    let accounts = match &args.accounts {
        Some(path) => {
            log::info!("Loading accounts from {}", path.display());
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open accounts file: {}", path.display()))?;
            let store = AccountStore::new();
            store
                .load_csv(file)
                .context("Failed to load accounts")?;
            store
        }
        None => {
            log::info!("No accounts file given, seeding demo cards");
            AccountStore::with_demo_accounts().context("Failed to seed demo accounts")?
        }
    };

    // 2. Build the core and serve it
    let core = Arc::new(BankingCore::new(accounts, &config));
    let state = AppState::new(Arc::clone(&core), &config.card_prefix);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Listening on {}", args.bind);

    server::serve(listener, state, shutdown_signal())
        .await
        .context("Server error")?;

    // 3. Persist the ledger if asked to
    if let Some(path) = &args.ledger_out {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create ledger file: {}", path.display()))?;
        core.log()
            .export_csv(file)
            .context("Failed to export the transaction log")?;
        log::info!("Ledger written to {}", path.display());
    }

    log::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        // Keep serving; the process can still be killed
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
