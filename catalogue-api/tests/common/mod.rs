//! Common test utilities for integration tests
//!
//! - Database setup (tests are skipped when `DATABASE_URL` is unset)
//! - A router wired to a [`FixedEmbedder`] and a temporary media root
//! - Technician creation and login
//! - Catalogue seeding with cleanup
//! - Request builders and body helpers

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use catalogue_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, MediaConfig, SessionConfig, VisionConfig},
};
use catalogue_shared::{
    auth::password::hash_password,
    db::migrations::run_migrations,
    models::{
        component::{Component, CreateComponent},
        technician::{CreateTechnician, Technician},
    },
    vision::{FixedEmbedder, ImageMatcher},
};
use sqlx::PgPool;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";
pub const BOUNDARY: &str = "catalogue-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
    pub embedder: Arc<FixedEmbedder>,
    pub media: TempDir,
    pub technician: Technician,
    /// Unique per context, used to keep seeded names apart
    pub tag: String,
    components: Mutex<Vec<i64>>,
}

impl TestContext {
    /// Builds a context with a default embedder, or `None` when no test
    /// database is configured.
    pub async fn new() -> Option<Self> {
        Self::with_embedder(FixedEmbedder::new(vec![1.0, 0.0])).await
    }

    pub async fn with_embedder(embedder: FixedEmbedder) -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return None;
        };

        let db = PgPool::connect(&url).await.expect("connect to test database");
        run_migrations(&db).await.expect("run migrations");

        let media = tempfile::tempdir().expect("create media root");
        let config = test_config(url, media.path());

        let tag = Uuid::new_v4().simple().to_string()[..12].to_string();
        let technician = Technician::create(
            &db,
            CreateTechnician {
                email: format!("tech-{}@example.com", tag),
                password_hash: hash_password(PASSWORD).expect("hash password"),
                display_name: "Jeanne Martin".to_string(),
            },
        )
        .await
        .expect("create technician");

        let embedder = Arc::new(embedder);
        let matcher = ImageMatcher::new(
            embedder.clone(),
            config.vision.logit_scale,
            config.vision.match_threshold,
        );
        let app = build_router(AppState::new(db.clone(), config.clone(), matcher));

        Some(Self {
            db,
            app,
            config,
            embedder,
            media,
            technician,
            tag,
            components: Mutex::new(Vec::new()),
        })
    }

    /// Sends a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("router call")
    }

    /// Logs in and returns the `Cookie` header value for later requests.
    pub async fn login(&self) -> String {
        let response = self.send(login_request(&self.technician.email, PASSWORD)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();

        set_cookie.split(';').next().unwrap().to_string()
    }

    /// Inserts a component that is deleted on cleanup.
    pub async fn component(&self, name: &str, parent_id: Option<i64>) -> Component {
        let component = Component::create(
            &self.db,
            CreateComponent {
                parent_id,
                name: name.to_string(),
                description: format!("{} description", name),
            },
        )
        .await
        .expect("create component");

        self.components.lock().unwrap().push(component.id);
        component
    }

    /// Number of stored sessions for the context's technician.
    pub async fn session_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM technician_sessions WHERE technician_id = $1")
            .bind(self.technician.id)
            .fetch_one(&self.db)
            .await
            .unwrap()
    }

    /// Files left in the upload staging directory.
    pub fn staged_files(&self) -> usize {
        match std::fs::read_dir(self.media.path().join("temp")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// Deletes seeded components and the technician (sessions cascade).
    pub async fn cleanup(&self) {
        let ids: Vec<i64> = self.components.lock().unwrap().drain(..).collect();
        for id in ids.into_iter().rev() {
            Component::delete(&self.db, id).await.unwrap();
        }
        Technician::delete(&self.db, self.technician.id).await.unwrap();
    }
}

fn test_config(database_url: String, media_root: &Path) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
        },
        media: MediaConfig {
            root: media_root.to_path_buf(),
            url: "/media/".to_string(),
        },
        session: SessionConfig { ttl_hours: 1 },
        vision: VisionConfig::default(),
    }
}

/// `POST /login` with a urlencoded form.
pub fn login_request(email: &str, password: &str) -> Request<Body> {
    let body = format!(
        "email={}&password={}",
        email.replace('@', "%40"),
        password.replace(' ', "+")
    );

    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

/// `GET` with an optional session cookie.
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `POST /image-search` with one multipart file field.
pub fn image_upload(cookie: &str, field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            b = BOUNDARY,
            f = field
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/image-search")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// `prefix` plus a random suffix, so parallel tests never share names.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
}
