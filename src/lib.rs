//! Portfolio Blog - library for app logic and testing

pub mod auth;
pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod media;
pub mod routes;
pub mod store;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::auth::{AdminAuthorizer, JwtAuthorizer};
use crate::blog::BlogService;
use crate::config::AppConfig;
use crate::logging::LogConfig;
use crate::media::{LocalObjectStore, ObjectStore};
use crate::routes::upload::UPLOAD_BODY_LIMIT;
use crate::store::{ContentStore, MemoryContentStore, PgContentStore};

/// Everything a handler may need, injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blog: BlogService,
    pub authorizer: Arc<dyn AdminAuthorizer>,
    pub tokens: JwtAuthorizer,
    pub media: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>) -> Self {
        let tokens = JwtAuthorizer::new(config.jwt_secret.clone());
        let media = LocalObjectStore::new(&config.upload_dir, &config.public_upload_base);

        Self {
            blog: BlogService::new(store),
            authorizer: Arc::new(tokens.clone()),
            tokens,
            media: Arc::new(media),
            config: Arc::new(config),
        }
    }
}

/// Postgres when `DATABASE_URL` is set and reachable, otherwise `None`.
async fn connect_store() -> Option<Arc<dyn ContentStore>> {
    if std::env::var("DATABASE_URL").is_err() {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
        return None;
    }

    let pool = match db::init_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialize database pool. Continuing without database.");
            return None;
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Failed to run database migrations. Continuing without database.");
        return None;
    }

    Some(Arc::new(PgContentStore::new(pool)))
}

pub async fn build_state(config: AppConfig) -> AppState {
    let store = match connect_store().await {
        Some(store) => store,
        None => {
            tracing::warn!("Using in-memory content store; posts will not survive a restart");
            Arc::new(MemoryContentStore::new())
        }
    };
    AppState::new(config, store)
}

pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.cors_origins())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn blog_router(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route(
            "/posts",
            get(routes::blog::admin_list_posts).post(routes::blog::create_post),
        )
        .route(
            "/posts/{id}",
            get(routes::blog::admin_get_post)
                .put(routes::blog::update_post)
                .delete(routes::blog::delete_post),
        )
        .route("/posts/{id}/status", patch(routes::blog::update_post_status))
        .route(
            "/upload",
            post(routes::upload::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_admin,
        ));

    Router::new()
        .route("/posts", get(routes::blog::list_posts))
        .route("/posts/{key}", get(routes::blog::get_post))
        .route("/tags", get(routes::blog::list_tags))
        .route("/search", get(routes::blog::search_posts))
        .nest("/admin", admin)
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(routes::auth::login))
        .route("/admin", get(routes::auth::admin_status))
        .route("/reset-password", post(routes::auth::reset_password))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);

    let mut app = Router::new()
        .nest("/api/blog", blog_router(&state))
        .nest("/api/auth", auth_router())
        .route("/rss.xml", get(routes::rss::rss_feed))
        .route("/health", get(routes::health::health_ping))
        .route("/health/ready", get(routes::health::health_ready));

    // Only a path-style base can be served from here; anything else is a CDN.
    let public_base = state.config.public_upload_base.as_str();
    if public_base.starts_with('/') && public_base != "/" {
        app = app.nest_service(public_base, ServeDir::new(&state.config.upload_dir));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        error::expose_error_detail,
    ))
    .layer(logging::middleware::propagate_request_id_layer())
    .layer(middleware::from_fn(logging::middleware::log_request))
    .layer(logging::middleware::request_id_layer())
    .layer(TraceLayer::new_for_http())
    .layer(CompressionLayer::new())
    .layer(RequestBodyLimitLayer::new(UPLOAD_BODY_LIMIT))
    .layer(cors)
    .with_state(state)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init(&LogConfig::from_env(config.environment));

    routes::health::init_start_time();

    if let Err(reason) = config.validate() {
        tracing::error!(%reason, "refusing to start");
        panic!("FATAL: {}", reason);
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT configuration");

    let state = build_state(config).await;
    let app = create_app(state);

    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    pub const ADMIN_TOKEN: &str = "test-admin-token";

    /// Accepts exactly [`ADMIN_TOKEN`].
    pub struct StaticTokenAuthorizer;

    #[async_trait]
    impl AdminAuthorizer for StaticTokenAuthorizer {
        async fn caller_is_admin(&self, credential: Option<&str>) -> bool {
            credential == Some(ADMIN_TOKEN)
        }
    }

    pub fn test_state() -> AppState {
        let upload_dir = std::env::temp_dir().join(format!("blog-uploads-{}", uuid::Uuid::new_v4()));
        let config = AppConfig {
            upload_dir: upload_dir.to_string_lossy().into_owned(),
            ..AppConfig::default()
        };
        let mut state = AppState::new(config, Arc::new(MemoryContentStore::new()));
        state.authorizer = Arc::new(StaticTokenAuthorizer);
        state
    }

    pub fn json_request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }
}
