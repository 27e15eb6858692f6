pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod render;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use config::Config;
pub use db::{AppState, LogConnection, LogStore, MongoStore};
pub use error::{LogViewError, LogViewResult};
pub use models::LogRecord;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::service_name))
        .route("/healthcheck", get(handlers::health_checker))
        .route("/v1/csv", get(handlers::export_csv))
        .route("/v1/logs/last", get(handlers::latest_logs))
        .route("/v1/logs/course", get(handlers::search_course))
        .route("/v1/logs/class", get(handlers::search_class))
        .route("/v1/logs/room", get(handlers::search_room))
        .route("/v1/logs/student", get(handlers::search_student))
        .layer(middleware::from_fn(access_log))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn access_log(req: Request, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "[server] request"
    );
    response
}
