use crate::api::error::AppError;
use crate::config::GatewayConfig;
use crate::services::content_type::{detect_content_type, probe};
use crate::services::storage::{ObjectStore, PutObject};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of upload timestamps (Unix seconds).
pub trait Clock: Send + Sync {
    fn now_epoch(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A file read out of the multipart form, held whole so its length is known
/// before the store is contacted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub body: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            body: body.into(),
        }
    }

    /// Declared length for the put request.
    pub fn content_length(&self) -> Result<i64, AppError> {
        i64::try_from(self.body.len()).map_err(|_| {
            AppError::Internal(format!(
                "size of {} ({} bytes) cannot be declared to the store",
                self.filename,
                self.body.len()
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: &'static str,
    pub size: i64,
}

/// `{prefix}{epoch}__{filename}`
pub fn object_key(prefix: &str, epoch: i64, filename: &str) -> String {
    format!("{}{}__{}", prefix, epoch, filename)
}

/// Last path component of a client-supplied filename, or `None` when nothing
/// usable is left.
pub fn base_filename(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    (!base.is_empty()).then_some(base)
}

pub struct UploadForwarder {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    bucket: String,
    prefix: String,
    upload_timeout: Option<Duration>,
}

impl UploadForwarder {
    pub fn new(config: &GatewayConfig, store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            bucket: config.bucket.clone(),
            prefix: config.path.clone(),
            upload_timeout: config.upload_timeout,
        }
    }

    /// Sends `file` to the store under a freshly derived key.
    pub async fn forward(&self, file: UploadedFile) -> Result<StoredObject, AppError> {
        let key = object_key(&self.prefix, self.clock.now_epoch(), &file.filename);
        let content_type = detect_content_type(probe(&file.body));
        let size = file.content_length()?;

        debug!(
            "Forwarding {} as {} ({} bytes, {})",
            file.filename, key, size, content_type
        );

        let put = self.store.put_object(PutObject {
            bucket: self.bucket.clone(),
            key: key.clone(),
            body: file.body,
            content_length: size,
            content_type: content_type.to_string(),
        });

        let result = match self.upload_timeout {
            Some(limit) => tokio::time::timeout(limit, put)
                .await
                .map_err(|_| AppError::StorageTimeout(limit))?,
            None => put.await,
        };
        result.map_err(|e| AppError::Storage(format!("{:#}", e)))?;

        Ok(StoredObject {
            key,
            content_type,
            size,
        })
    }
}
