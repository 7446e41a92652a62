use axum::http::StatusCode;

pub const HEALTH_PATH: &str = "/healthz";

/// Liveness probe. Never touches the store, so it stays green regardless of
/// storage configuration.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
