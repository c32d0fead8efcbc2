/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use catalogue_api::{app::{build_router, AppState}, config::Config};
/// use catalogue_shared::vision::{FixedEmbedder, ImageMatcher};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let matcher = ImageMatcher::new(Arc::new(FixedEmbedder::new(vec![1.0])), 100.0, 0.6);
/// let app = build_router(AppState::new(pool, config, matcher));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
    session::{extract_session_cookie, SessionContext},
};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use catalogue_shared::{
    auth::session::{hash_session_token, is_well_formed},
    models::session::Session,
    vision::ImageMatcher,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// CLIP matcher, loaded once at startup and never mutated
    pub matcher: Arc<ImageMatcher>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, matcher: ImageMatcher) -> Self {
        Self {
            db,
            config: Arc::new(config),
            matcher: Arc::new(matcher),
        }
    }
}

/// Builds the router
///
/// ```text
/// /
/// ├── GET  /health                     # public
/// ├── POST /login                      # public
/// ├── GET|POST /logout                 # public
/// ├── GET  /                           # session: component list + root
/// ├── GET  /components/:id/model3d     # session: 3D model URL
/// ├── GET  /components/:id/sheet       # session: technical sheet
/// ├── GET  /search?q=                  # session: name search
/// └── POST /image-search               # session: multipart `image`
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/login", post(routes::auth::login))
        .route("/logout", get(routes::auth::logout).post(routes::auth::logout));

    let technician_routes = Router::new()
        .route("/", get(routes::catalogue::home))
        .route("/components/:component_id/model3d", get(routes::components::get_model3d))
        .route("/components/:component_id/sheet", get(routes::components::technical_sheet))
        .route("/search", get(routes::search::search_components))
        .route(
            "/image-search",
            post(routes::image_search::image_search).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(technician_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication layer
///
/// Resolves the session cookie to an active session and injects a
/// [`SessionContext`] into request extensions.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_cookie(req.headers())
        .filter(|token| is_well_formed(token))
        .ok_or_else(|| ApiError::Unauthorized("Please log in".to_string()))?;

    let session = Session::find_active(&state.db, &hash_session_token(&token))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session expired, please log in again".to_string()))?;

    req.extensions_mut().insert(SessionContext::from(session));

    Ok(next.run(req).await)
}
