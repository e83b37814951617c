use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meditone_core::{
    load_config, validate_config, ContentStore, FfmpegMixer, HttpNarrationGenerator, JobStore,
    Mixer, NarrationGenerator, PipelineOrchestrator, SqliteContentStore, SqliteJobStore,
};
use meditone_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MEDITONE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Create SQLite stores
    let job_store: Arc<dyn JobStore> = Arc::new(
        SqliteJobStore::new(&config.database.path).context("Failed to create job store")?,
    );
    let content_store: Arc<dyn ContentStore> = Arc::new(
        SqliteContentStore::new(&config.database.path)
            .context("Failed to create content store")?,
    );
    info!("Job and content stores initialized");

    // Create external services
    info!("Initializing TTS client at {}", config.generator.url);
    let generator: Arc<dyn NarrationGenerator> = Arc::new(
        HttpNarrationGenerator::new(config.generator.clone())
            .context("Failed to create narration generator")?,
    );

    let mixer = FfmpegMixer::new(config.mixer.clone());
    if let Err(e) = mixer.validate().await {
        // Jobs will fail until ffmpeg is available, the control plane still works
        warn!("Mixer validation failed: {}", e);
    }
    let mixer: Arc<dyn Mixer> = Arc::new(mixer);

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        config.pipeline.clone(),
        config.mix.clone(),
        Arc::clone(&job_store),
        Arc::clone(&content_store),
        generator,
        mixer,
    ));

    if config.pipeline.enabled {
        orchestrator.start().await;
    } else {
        info!("Pipeline scheduler disabled in config, batches run on request only");
    }

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        job_store,
        content_store,
        Arc::clone(&orchestrator),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if orchestrator.is_running() {
        orchestrator.stop().await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
