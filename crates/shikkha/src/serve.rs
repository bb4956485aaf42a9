// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shikkha serve` command implementation.
//!
//! Wires the SQLite store, the SMS gateway transport, and the bulk
//! orchestrator together, starts the monthly-result and month-end-preview
//! schedulers, and waits for a shutdown signal. Stopping the schedulers
//! only prevents future ticks; an in-flight processing run completes.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use shikkha_config::model::ShikkhaConfig;
use shikkha_core::{CreditLedger, ShikkhaError, Store};
use shikkha_gateway::SmsGatewayClient;
use shikkha_notify::BulkSender;
use shikkha_provider::GeminiClient;
use shikkha_scheduler::{MonthEndPreviewScheduler, MonthlyResultScheduler};
use shikkha_storage::SqliteStore;

/// Initialize the tracing subscriber with an env-filter.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shikkha={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// is received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Build the bulk sender over an initialized store and the configured
/// gateway.
fn build_sender(
    config: &ShikkhaConfig,
    store: &Arc<SqliteStore>,
) -> Result<Arc<BulkSender>, ShikkhaError> {
    let transport = Arc::new(SmsGatewayClient::new(&config.gateway)?);
    let ledger: Arc<dyn CreditLedger> = Arc::clone(store) as Arc<dyn CreditLedger>;
    let dyn_store: Arc<dyn Store> = Arc::clone(store) as Arc<dyn Store>;
    Ok(Arc::new(BulkSender::new(
        transport,
        ledger,
        dyn_store,
        &config.billing,
        &config.dispatch,
    )))
}

/// Runs the `shikkha serve` command.
pub async fn run_serve(config: ShikkhaConfig) -> Result<(), ShikkhaError> {
    info!(instance = %config.app.name, "starting shikkha serve");

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let sender = build_sender(&config, &store)?;

    // The AI provider is optional; question generation is simply
    // unavailable without configured keys.
    match GeminiClient::new(&config.ai) {
        Ok(provider) => {
            info!(eligible_keys = provider.eligible_keys().await, "AI provider ready");
        }
        Err(e) => {
            info!(reason = %e, "AI provider disabled");
        }
    }

    let tick_interval = Duration::from_secs(config.scheduler.tick_interval_secs);
    let monthly = Arc::new(MonthlyResultScheduler::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&store) as Arc<dyn CreditLedger>,
        Arc::clone(&sender),
        tick_interval,
    ));
    let preview = Arc::new(MonthEndPreviewScheduler::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&sender),
        tick_interval,
    ));

    if config.scheduler.enabled {
        monthly.start();
        preview.start();
    } else {
        info!("schedulers disabled by configuration");
    }

    let shutdown = install_signal_handler();
    shutdown.cancelled().await;

    monthly.stop();
    preview.stop();
    store.close().await?;
    info!("shikkha serve stopped");
    Ok(())
}

/// Runs the `shikkha trigger-monthly` admin command.
pub async fn run_trigger_monthly(
    config: ShikkhaConfig,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<(), ShikkhaError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let sender = build_sender(&config, &store)?;
    let scheduler = MonthlyResultScheduler::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&store) as Arc<dyn CreditLedger>,
        sender,
        Duration::from_secs(config.scheduler.tick_interval_secs),
    );

    let stats = scheduler.manual_trigger(year, month).await?;
    if stats.already_processed {
        println!(
            "{}-{:02}: already processed, nothing to do",
            stats.year, stats.month
        );
    } else {
        println!(
            "{}-{:02}: {} result rows created, {} batches notified, {} skipped for balance",
            stats.year,
            stats.month,
            stats.results_created,
            stats.batches_notified,
            stats.batches_skipped
        );
    }

    store.close().await?;
    Ok(())
}
