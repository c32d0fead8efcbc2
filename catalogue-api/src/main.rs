//! # Catalogue API Server
//!
//! Technician-facing catalogue: login, component browsing, technical sheets,
//! name search and CLIP-based photo search.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment
//! 2. Open the database pool and apply migrations
//! 3. Load the CLIP encoders (downloaded on first start)
//! 4. Serve until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/catalogue cargo run -p catalogue-api
//! ```

use anyhow::Context;
use catalogue_api::{
    app::{build_router, AppState},
    config::Config,
};
use catalogue_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, PoolConfig},
    },
    models::session::Session,
    vision::{Embedder, ImageMatcher},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalogue_api=debug,catalogue_shared=debug,tower_http=debug".into());

    // JSON lines in production, human-readable otherwise
    if config.api.production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Catalogue API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(PoolConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    let purged = Session::delete_expired(&pool).await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired sessions");
    }

    let embedder = load_embedder(&config).await?;
    let matcher = ImageMatcher::new(
        embedder,
        config.vision.logit_scale,
        config.vision.match_threshold,
    );

    let addr = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, matcher));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

#[cfg(feature = "clip")]
async fn load_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    use catalogue_shared::vision::{ClipConfig, ClipEmbedder};

    let clip_config = ClipConfig {
        cache_dir: config.vision.cache_dir.clone(),
        device: config.vision.device,
        show_download_progress: !config.api.production,
    };

    // Model download and ONNX session setup block for a while.
    let embedder = tokio::task::spawn_blocking(move || ClipEmbedder::load(&clip_config))
        .await
        .context("Model loading task failed")?
        .context("Failed to load the CLIP model")?;

    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "clip"))]
async fn load_embedder(_config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    anyhow::bail!("Image search requires the `clip` feature; rebuild with default features")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
