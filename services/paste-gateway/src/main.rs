// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Paste Gateway Service
//!
//! HTTP front for the paste store with per-caller write quotas.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `PASTE_LIMIT`: Writes per caller per window (default: 5000)
//! - `PASTE_WINDOW_SECS`: Quota window length (default: 3600)
//! - `ORIGIN_ALLOW_LIST`: Comma separated origins allowed to read (default: empty, reads open)
//! - `TRUST_FORWARDED_HEADERS`: Use X-Forwarded-For and friends as the caller key (default: true)
//! - `STORE_TIMEOUT_MS`: Per store operation timeout (default: 5000)
//! - `QUOTA_GC_INTERVAL_SECS`: Expired quota purge interval (default: 300)
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)
//! - `SITE_URL`: Site URL reported by `/public`

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paste_gateway::{
    backend::{MemoryBackend, QuotaTable},
    clock::{Clock, SystemClock},
    config::Config,
    gateway::Gateway,
    handlers::{router, AppState},
    metrics::GatewayMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        limit = config.quota.limit,
        window_secs = config.quota.window_secs,
        origin_policy = !config.access.origin_allow_list.is_empty(),
        store_timeout_ms = config.store.operation_timeout_ms,
        "Starting paste gateway"
    );

    let backend = Arc::new(MemoryBackend::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = GatewayMetrics::new()?;
    let gateway = Gateway::new(&config, backend.clone(), clock.clone(), metrics);

    let state = Arc::new(AppState {
        gateway,
        config: config.clone(),
    });

    // Spawn quota purge task
    let gc_interval = config.store.gc_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(gc_interval);
        loop {
            interval.tick().await;
            match backend.purge_expired(clock.now()).await {
                Ok(purged) if purged > 0 => info!(purged, "Purged expired quota records"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Quota purge failed"),
            }
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
