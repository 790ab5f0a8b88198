use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::HttpMetrics;
use zenpic_core::config::{config_from_env_values, max_upload_bytes_from_env_value, port_from_env_value};
use zenpic_core::Library;

/// Main entry point for the Zenpic media service
///
/// Serves the photo and music libraries over REST with OpenAPI/Swagger documentation
/// and Prometheus metrics on `/metrics`.
///
/// # Environment Variables
/// - `STORAGE_PATH`: Photo library root (default: "./uploads")
/// - `MUSIC_STORAGE_PATH`: Music library root (default: "./uploads-music")
/// - `PORT`: Listening port on all interfaces (default: 9090)
/// - `ZENPIC_MAX_UPLOAD_BYTES`: Upload request body limit (default: 50 MiB)
/// - `RUST_LOG`: Log filter (default directive: "zenpic=info")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zenpic=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cwd = std::env::current_dir()?;
    let cfg = Arc::new(config_from_env_values(
        std::env::var("STORAGE_PATH").ok(),
        std::env::var("MUSIC_STORAGE_PATH").ok(),
        &cwd,
    )?);
    let port = port_from_env_value(std::env::var("PORT").ok())?;
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("ZENPIC_MAX_UPLOAD_BYTES").ok())?;

    for library in [Library::Photos, Library::Music] {
        let root = cfg.root(library);
        if root.is_dir() {
            tracing::info!("{:?} library at {}", library, root.display());
        } else {
            tracing::warn!(
                "{:?} library root does not exist yet, first upload will create it: {}",
                library,
                root.display()
            );
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("++ Starting Zenpic REST on {}", addr);

    let metrics = HttpMetrics::new()?;
    let app = api_rest::router(cfg, max_upload_bytes, metrics);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
