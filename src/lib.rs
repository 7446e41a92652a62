pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;

use crate::api::handlers::health::{HEALTH_PATH, health_check};
use crate::api::middleware::request_id::REQUEST_ID_HEADER;
use crate::config::GatewayConfig;
use crate::services::storage::ObjectStore;
use crate::services::upload::{Clock, UploadForwarder};
use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{any, get},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Headroom for boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub uploader: Arc<UploadForwarder>,
}

impl AppState {
    pub fn new(config: GatewayConfig, store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>) -> Self {
        let uploader = Arc::new(UploadForwarder::new(&config, store, clock));
        Self {
            config: Arc::new(config),
            uploader,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let handler_path = state.config.handler.clone();
    let body_limit = state.config.max_upload_size.saturating_add(MULTIPART_OVERHEAD);

    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        });

    Router::new()
        .route(HEALTH_PATH, get(health_check).post(health_check))
        .route(
            &handler_path,
            any(api::handlers::upload::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(from_fn(api::middleware::access_log::access_log_middleware))
        .layer(trace_layer)
        // Outermost, so the span above sees generated ids too.
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
