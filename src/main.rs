use incident_service::{
    api::{build_router, AppState},
    config::Config,
    notifications::NotificationDispatcher,
    processing::IncidentProcessor,
    state::create_store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    init_tracing(&config);

    tracing::info!("Starting incident service v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = incident_service::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    }

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.database.backend);
    let store = create_store(&config.database).await?;
    tracing::info!("Storage backend initialized");

    let mut processor = IncidentProcessor::new(store);

    if config.notifications.enabled {
        match NotificationDispatcher::from_config(&config.notifications) {
            Ok(dispatcher) => {
                processor = processor.with_dispatcher(Arc::new(dispatcher));
            }
            Err(e) => {
                tracing::warn!("Notification dispatcher initialization failed: {}", e);
                tracing::warn!("Continuing without notifications");
            }
        }
    } else {
        tracing::info!("Notifications disabled in configuration");
    }

    let app_state = AppState::new(Arc::new(processor));
    let app = build_router(app_state, &config.cors);

    let http_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   REST API: http://{}/incidents", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "incident_service={level},tower_http={level}",
            level = config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
