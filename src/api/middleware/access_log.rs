use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Records who asked for what before the handler runs, then the outcome.
/// Purely observational: nothing here can reject a request.
pub async fn access_log_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!(
        target: "access",
        remote_addr = %remote_addr,
        method = %method,
        path = %path,
        "request_received"
    );

    let response = next.run(req).await;

    info!(
        target: "access",
        remote_addr = %remote_addr,
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "request_completed"
    );

    response
}
