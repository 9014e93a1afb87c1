//! Camera API server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use orderly_camera::camera::{Camera, CameraRegistry, FakeCamera};
use orderly_camera::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Orderly camera API");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        port = config.port,
        public_url = %config.kernel.public_url,
        photos_dir = ?config.photos_dir,
        "Configuration loaded"
    );

    // No hardware drivers yet; the emulated camera is always present.
    let cameras: Vec<Arc<dyn Camera>> = vec![Arc::new(FakeCamera::new(config.warmup))];
    let registry = CameraRegistry::new(&config.photos_dir, cameras)
        .context("failed to initialize cameras")?;
    info!(cameras = registry.len(), "Cameras ready");

    let state = AppState::new(&config.kernel, registry)?;

    let app = orderly_camera::app(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
