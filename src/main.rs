use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use travel_satisfaction::{
    api::{build_router, AppState},
    config::{Config, ObservabilityConfig},
    ml::load_model_handle,
    session::SessionManager,
};

#[derive(Parser)]
#[command(name = "travel-satisfaction")]
#[command(about = "Traveller satisfaction prediction service", version)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Model artifact to load instead of `model.path`
    #[arg(short, long, env = "MODEL_PATH")]
    model_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    // A bad PORT or config file is fatal; falling back to defaults would also
    // discard SECRET_KEY
    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    init_tracing(&config.observability);

    if let Some(path) = cli.model_path {
        config.model.path = path;
    }

    tracing::info!("Starting travel-satisfaction v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.prometheus_enabled {
        if let Err(e) = travel_satisfaction::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // A missing or broken model is not fatal: /predict answers 500 until restart
    let model = load_model_handle(&config.model.path);
    if model.is_none() {
        tracing::warn!("⚠️  Serving without a model, predictions are unavailable");
    }

    if config.session.uses_insecure_secret() {
        tracing::warn!("⚠️  SECRET_KEY is not set, session cookies are signed with the built-in default key");
    }
    let sessions = SessionManager::new(&config.session)?;

    let state = AppState::new(model, sessions).with_static_dir(config.server.static_dir.clone());
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!("🚀 HTTP server listening on http://{}", address);
    tracing::info!("   Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "travel_satisfaction={level},tower_http={level}",
            level = observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
