//! Nexus Router - Entry Point
//!
//! Initializes configuration, logging, chain connections and the
//! routing API. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the chain registry
//! 4. Connect alloy providers for every EVM chain with an RPC URL
//! 5. Create CoinGecko price source (rate limited)
//! 6. Create Gemini explainer (fallback text when unconfigured)
//! 7. Create RoutingService + Prometheus metrics
//! 8. Bind the listener, spawn the HTTP server (routing API + /live + /ready + /metrics)
//! 9. Wait for SIGINT or server exit → graceful shutdown (readiness→drain→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use nexus_router::adapters::chain::AlloyGasSource;
use nexus_router::adapters::explain::GeminiExplainer;
use nexus_router::adapters::http::{AppState, HttpServer};
use nexus_router::adapters::metrics::RoutingMetrics;
use nexus_router::adapters::prices::CoinGeckoSource;
use nexus_router::config;
use nexus_router::usecases::{ChainMetricsCollector, PriceOracleClient, RoutingService};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.service.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        chains = config.chains.len(),
        bind = %config.service.bind_address,
        "Starting Nexus router"
    );

    // ── 3. Chain registry (immutable for the process) ───────
    let registry = Arc::new(
        config::loader::build_registry(&config).context("Invalid chain catalog")?,
    );

    // ── 4. Gas sources: one alloy provider per EVM chain ────
    let gas_source = Arc::new(
        AlloyGasSource::connect_all(&config.chains, config.collection.connect_timeout()).await,
    );
    let collector = ChainMetricsCollector::new(gas_source, config.collection.chain_timeout());

    // ── 5. Price oracle (CoinGecko, rate limited) ───────────
    let price_source = Arc::new(
        CoinGeckoSource::new(&config.prices, config.collection.price_timeout())
            .context("Failed to create price source")?,
    );
    let oracle = PriceOracleClient::new(
        price_source,
        config.prices.token_ids.clone(),
        config.collection.price_timeout(),
    );

    // ── 6. Explanation collaborator (optional) ──────────────
    let explainer =
        GeminiExplainer::new(&config.explanation, config.collection.explanation_timeout())
            .context("Failed to create explainer")?;
    if !explainer.is_configured() {
        warn!(
            env = %config.explanation.api_key_env,
            "Explanation key not set, responses will carry the fallback text"
        );
    }

    // ── 7. Routing service + metrics ────────────────────────
    let metrics = if config.metrics.enabled {
        Some(Arc::new(RoutingMetrics::new().context("Failed to register metrics")?))
    } else {
        None
    };

    let mut service = RoutingService::new(
        registry,
        collector,
        oracle,
        Arc::new(explainer),
        config.collection.explanation_timeout(),
    );
    if let Some(m) = &metrics {
        service = service.with_metrics(Arc::clone(m));
    }
    let service = Arc::new(service);

    if service.connected_chains() == 0 {
        warn!("No chain endpoints connected, /route will answer 503 until restarted");
    }

    // ── 8. Bind + spawn HTTP server ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let state = AppState::new(Arc::clone(&service), metrics);
    let accepting = Arc::clone(&state.accepting);

    let server = HttpServer::new(state, config.service.bind_address.clone());
    let listener = server.bind().await?;
    let mut server_shutdown = shutdown_tx.subscribe();
    let mut server_handle = tokio::spawn(server.serve(listener, async move {
        let _ = server_shutdown.recv().await;
    }));

    info!("Router is running");

    // ── 9. Wait for SIGINT or an early server exit ──────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        exit = &mut server_handle => {
            accepting.store(false, Ordering::Relaxed);
            exit.context("HTTP server task panicked")?
                .context("HTTP server failed")?;
            error!("HTTP server stopped without a shutdown signal");
            return Err(anyhow!("HTTP server stopped unexpectedly"));
        }
    }

    // ── Graceful shutdown (readiness→drain→exit) ────────────

    // 1. Mark not ready (readiness probe → 503)
    accepting.store(false, Ordering::Relaxed);

    // 2. Stop accepting connections, let in-flight requests finish
    let _ = shutdown_tx.send(());

    // 3. Wait for the server to drain (up to 15s)
    if tokio::time::timeout(Duration::from_secs(15), server_handle)
        .await
        .is_err()
    {
        warn!("HTTP server did not drain in time");
    }

    info!("Shutdown complete");
    Ok(())
}
