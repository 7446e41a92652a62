use clap::Parser;
use dotenvy::dotenv;
use s3_upload_gateway::config::{CliArgs, GatewayConfig};
use s3_upload_gateway::infrastructure::storage;
use s3_upload_gateway::services::upload::SystemClock;
use s3_upload_gateway::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_upload_gateway=info,access=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting S3 Upload Gateway...");

    // 2. Configuration, validated before anything binds
    let config = GatewayConfig::from_env(args).inspect_err(|e| {
        error!("❌ Invalid configuration: {}", e);
    })?;
    info!(
        "⚙️  Config: Bucket={}, Region={}, Prefix={}, Handler={}, Max Size={}MB",
        config.bucket,
        config.region,
        config.path,
        config.handler,
        config.max_upload_size / 1024 / 1024
    );

    // 3. Storage & application state
    let storage_service = storage::setup_storage(&config);
    let state = AppState::new(config.clone(), storage_service, Arc::new(SystemClock));

    let app = create_app(state);

    // 4. Serve
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("✅ Listening on http://{}", listener.local_addr()?);
    info!("📤 Upload endpoint: {}", config.handler);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("👋 Gateway exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
