use crate::config::GatewayConfig;
use crate::services::storage::{ObjectStore, S3ObjectStore};
use std::sync::Arc;
use tracing::info;

pub fn setup_storage(config: &GatewayConfig) -> Arc<dyn ObjectStore> {
    match &config.endpoint {
        Some(endpoint) => info!(
            "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
            endpoint, config.bucket, config.region
        ),
        None => info!(
            "☁️  S3 Storage: AWS (Bucket: {}, Region: {})",
            config.bucket, config.region
        ),
    }

    Arc::new(S3ObjectStore::new(
        config.region.clone(),
        config.endpoint.clone(),
    ))
}
