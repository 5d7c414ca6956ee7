use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::PasswordHasher;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::ForumStore;
use crate::handlers;
use crate::middleware::request_span;

/// Shared by every handler. Cloning is cheap: the store is behind an `Arc`
/// and the hasher holds only its cost and an `Arc<str>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ForumStore>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn ForumStore>, passwords: PasswordHasher) -> Self {
        Self { store, passwords }
    }
}

/// The full HTTP surface with its middleware stack.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health_get))
        .merge(auth_routes())
        .merge(topic_routes())
        .merge(post_routes())
        .merge(comment_routes())
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.security))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http().make_span_with(request_span));
    }

    app.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::auth_signup))
        .route("/auth/login", post(handlers::auth_login))
}

fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(handlers::topic_list).post(handlers::topic_create))
        .route(
            "/topics/:topic_id",
            patch(handlers::topic_patch).delete(handlers::topic_delete),
        )
        .route(
            "/topics/:topic_id/posts",
            get(handlers::post_list).post(handlers::post_create),
        )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/:post_id",
            get(handlers::post_get)
                .patch(handlers::post_patch)
                .delete(handlers::post_delete),
        )
        .route(
            "/posts/:post_id/comments",
            get(handlers::comment_list).post(handlers::comment_create),
        )
}

fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/comments/:comment_id",
        patch(handlers::comment_patch).delete(handlers::comment_delete),
    )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(300))
}
