use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supportai_core::{
    load_config_or_default, validate_config, Enricher, EnrichmentPipeline, LlmClient,
    MessageBus, NatsBus, OllamaClient, SanitizedConfig,
};
use supportai_server::api::create_router;
use supportai_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("SUPPORTAI_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    init_tracing();
    info!(version = VERSION, "Starting supportai");

    // Determine config path
    let config_path = std::env::var("SUPPORTAI_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        bus_url = %sanitized.bus.url,
        raw_subject = %config.bus.raw_subject,
        enriched_subject = %config.bus.enriched_subject,
        model = %config.llm.model,
        api_base = %config.llm.api_base,
        max_concurrent = config.pipeline.max_concurrent,
        "Configuration loaded"
    );

    // Connect to the message bus
    let nats = Arc::new(
        NatsBus::connect(&config.bus)
            .await
            .context("Failed to connect to message bus")?,
    );
    let bus: Arc<dyn MessageBus> = Arc::clone(&nats) as Arc<dyn MessageBus>;

    // Generation service client
    let client: Arc<dyn LlmClient> = Arc::new(
        OllamaClient::new(config.llm.model.clone())
            .with_api_base(config.llm.api_base.clone())
            .with_timeout(config.llm.timeout()),
    );
    let enricher = Arc::new(
        Enricher::new(client, config.llm.timeout())
            .with_max_error_body_bytes(config.llm.max_error_body_bytes),
    );

    // Enrichment pipeline: a rejected subscription is fatal
    let pipeline = Arc::new(EnrichmentPipeline::new(
        &config.pipeline,
        &config.bus,
        Arc::clone(&bus),
        enricher,
    ));
    pipeline
        .start()
        .await
        .context("Failed to start enrichment pipeline")?;

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, bus, Some(Arc::clone(&pipeline))));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down enrichment pipeline");
    pipeline.stop().await;

    if let Err(e) = nats.flush().await {
        warn!(error = %e, "Failed to flush message bus on shutdown");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
