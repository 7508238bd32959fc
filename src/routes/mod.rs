use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod auth;
pub mod extract;
pub mod health;
pub mod middleware_auth;
pub mod tasks;

use crate::config::Config;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/tasks", get(tasks::routes::list).post(tasks::routes::create))
        .route(
            "/tasks/{id}",
            get(tasks::routes::get)
                .put(tasks::routes::update)
                .delete(tasks::routes::delete),
        )
        .route("/me", get(auth::me).delete(auth::delete_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_auth::require_auth,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .merge(protected)
        .with_state(state)
}

/// `routes` wrapped in the timeout, CORS and request-logging layers.
pub fn app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let origin: HeaderValue = config.cors_origin.parse()?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(routes(state)
        .layer(timeout_layer(config))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Slow requests are answered with 408.
fn timeout_layer(config: &Config) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    )
}

async fn root() -> &'static str {
    "Task tracker API"
}
