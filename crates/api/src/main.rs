use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use napwatch_core::store::{MemoryReportStore, ReportStore};
use napwatch_events::{EventBus, WebhookDelivery, WebhookForwarder};
use napwatch_pipeline::{AuditEngine, Scheduler};
use napwatch_providers::{
    FixtureProvider, HttpPlatformProvider, PlatformProvider, RetryPolicy, RetryingProvider,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use napwatch_api::config::ServerConfig;
use napwatch_api::router::build_app_router;
use napwatch_api::seed::Seed;
use napwatch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "napwatch_api=debug,napwatch_pipeline=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let seed = Seed::load(&config.seed_path)
        .await
        .expect("Failed to load seed file");
    tracing::info!(
        path = %config.seed_path,
        platforms = seed.config.platforms.len(),
        "Seed loaded"
    );

    // --- Database (optional) ---
    let pool = match &config.database_url {
        Some(url) => {
            let pool = napwatch_db::create_pool(url)
                .await
                .expect("Failed to connect to database");
            napwatch_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            napwatch_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database ready, reports will be persisted");
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, reports are kept in memory only");
            None
        }
    };
    let pg_store = pool
        .as_ref()
        .map(|pool| Arc::new(napwatch_db::PgReportStore::new(pool.clone())));
    let store: Arc<dyn ReportStore> = match &pg_store {
        Some(pg) => pg.clone(),
        None => Arc::new(MemoryReportStore::with_capacity(seed.config.history_limit)),
    };

    // --- Provider ---
    let provider: Arc<dyn PlatformProvider> = match &config.fixture_path {
        Some(path) => {
            let fixtures = FixtureProvider::from_file(path)
                .await
                .expect("Failed to load platform fixtures");
            tracing::warn!(%path, "Serving platform snapshots from fixture file");
            Arc::new(fixtures)
        }
        None => {
            let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
            let http =
                HttpPlatformProvider::new(fetch_timeout).expect("Failed to build HTTP client");
            Arc::new(RetryingProvider::new(
                http,
                RetryPolicy {
                    max_attempts: config.fetch_max_attempts,
                    attempt_timeout: fetch_timeout + Duration::from_secs(1),
                    ..Default::default()
                },
            ))
        }
    };

    // --- Event bus and webhook forwarding ---
    let event_bus = Arc::new(EventBus::default());
    let forwarder_cancel = CancellationToken::new();
    let forwarder_handle = if config.alert_webhook_urls.is_empty() {
        None
    } else {
        let delivery = WebhookDelivery::new().expect("Failed to build webhook client");
        let forwarder = WebhookForwarder::new(delivery, config.alert_webhook_urls.clone());
        Some(tokio::spawn(
            forwarder.run(event_bus.subscribe(), forwarder_cancel.clone()),
        ))
    };

    // --- Engine and scheduler ---
    let engine = AuditEngine::new(
        seed.master,
        seed.config,
        provider,
        event_bus.clone(),
        store,
    )
    .expect("Invalid audit configuration");

    if let Some(pg) = &pg_store {
        let limit = engine.get_config().await.history_limit;
        match pg.load_recent(limit).await {
            Ok(reports) => engine.restore_history(reports).await,
            Err(e) => tracing::error!(error = %e, "Failed to restore report history"),
        }
    }
    let scheduler = Arc::new(Scheduler::new(Arc::clone(&engine)));
    scheduler.start().await;

    if engine.get_config().await.enabled {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine.run_full_audit().await;
        });
    }

    // --- App ---
    let state = AppState {
        engine,
        scheduler: Arc::clone(&scheduler),
        pool,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    scheduler.shutdown().await;

    forwarder_cancel.cancel();
    if let Some(handle) = forwarder_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
