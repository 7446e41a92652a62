use crate::api::handlers::health::HEALTH_PATH;
use clap::Parser;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Command line overrides. Every flag falls back to its environment variable,
/// then to the built-in default.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Bucket to upload files to (required) [env: BUCKET]
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region [env: REGION]
    #[arg(long)]
    pub region: Option<String>,

    /// Key prefix uploaded files are stored under [env: S3_PATH]
    #[arg(long)]
    pub path: Option<String>,

    /// Path the upload endpoint is mounted on [env: HANDLER]
    #[arg(long)]
    pub handler: Option<String>,

    /// host:port combination to listen on [env: LISTEN]
    #[arg(long)]
    pub listen: Option<String>,

    /// S3-compatible endpoint URL, e.g. a MinIO server [env: S3_ENDPOINT]
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Largest accepted file in bytes [env: MAX_UPLOAD_SIZE]
    #[arg(long)]
    pub max_upload_size: Option<usize>,

    /// Seconds allowed for the store call, 0 disables [env: UPLOAD_TIMEOUT_SECS]
    #[arg(long)]
    pub upload_timeout: Option<u64>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a bucket is required: pass --bucket or set BUCKET")]
    MissingBucket,

    #[error("upload handler path must start with '/', got {0:?}")]
    InvalidHandlerPath(String),

    #[error("upload handler path {0:?} collides with the health endpoint")]
    HandlerShadowsHealth(String),

    #[error("upload handler path {0:?} must be a literal path without ':', '*', '{{' or '}}' segments")]
    HandlerPathNotLiteral(String),
}

/// Storage target and listener settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Target bucket name
    pub bucket: String,

    /// Store region (default: "us-east-1")
    pub region: String,

    /// Key prefix (default: "upload/")
    pub path: String,

    /// Upload endpoint path (default: "/upload")
    pub handler: String,

    /// Bind address (default: ":8080")
    pub listen: String,

    /// Custom endpoint for S3-compatible stores
    pub endpoint: Option<String>,

    /// Maximum file size in bytes (default: 256 MB)
    pub max_upload_size: usize,

    /// Deadline for the outbound put, unset means no deadline
    pub upload_timeout: Option<Duration>,
}

impl GatewayConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_PATH: &'static str = "upload/";
    pub const DEFAULT_HANDLER: &'static str = "/upload";
    pub const DEFAULT_LISTEN: &'static str = ":8080";
    pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 256 * 1024 * 1024; // 256 MB

    /// Load configuration from flags and process environment variables
    pub fn from_env(args: CliArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, |key| env::var(key).ok())
    }

    /// Merge flags over values returned by `lookup`, then validate.
    pub fn resolve<F>(args: CliArgs, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: Option<String>, key: &str| {
            flag.or_else(|| lookup(key)).filter(|v| !v.is_empty())
        };

        let bucket = pick(args.bucket, "BUCKET").ok_or(ConfigError::MissingBucket)?;

        let handler =
            pick(args.handler, "HANDLER").unwrap_or_else(|| Self::DEFAULT_HANDLER.to_string());
        if !handler.starts_with('/') {
            return Err(ConfigError::InvalidHandlerPath(handler));
        }
        if handler == HEALTH_PATH {
            return Err(ConfigError::HandlerShadowsHealth(handler));
        }
        if !is_literal_path(&handler) {
            return Err(ConfigError::HandlerPathNotLiteral(handler));
        }

        let max_upload_size = args
            .max_upload_size
            .or_else(|| lookup("MAX_UPLOAD_SIZE").and_then(|v| v.parse().ok()))
            .unwrap_or(Self::DEFAULT_MAX_UPLOAD_SIZE);

        let upload_timeout = args
            .upload_timeout
            .or_else(|| lookup("UPLOAD_TIMEOUT_SECS").and_then(|v| v.parse().ok()))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            bucket,
            region: pick(args.region, "REGION")
                .unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
            path: pick(args.path, "S3_PATH").unwrap_or_else(|| Self::DEFAULT_PATH.to_string()),
            handler,
            listen: pick(args.listen, "LISTEN")
                .unwrap_or_else(|| Self::DEFAULT_LISTEN.to_string()),
            endpoint: pick(args.endpoint, "S3_ENDPOINT"),
            max_upload_size,
            upload_timeout,
        })
    }

    /// Address handed to the listener. A bare `:port` binds every interface.
    pub fn bind_address(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }

    /// Create config for tests and local runs against a fixed bucket
    pub fn development(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            region: Self::DEFAULT_REGION.to_string(),
            path: Self::DEFAULT_PATH.to_string(),
            handler: Self::DEFAULT_HANDLER.to_string(),
            listen: "127.0.0.1:8080".to_string(),
            endpoint: None,
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
            upload_timeout: None,
        }
    }
}

// The router reads `:name`, `*rest` and braces as captures.
fn is_literal_path(path: &str) -> bool {
    path.split('/').all(|segment| {
        !segment.starts_with([':', '*']) && !segment.contains(['{', '}'])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            GatewayConfig::resolve(CliArgs::default(), lookup_from(&[("BUCKET", "media")]))
                .unwrap();
        assert_eq!(config.bucket, "media");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.path, "upload/");
        assert_eq!(config.handler, "/upload");
        assert_eq!(config.listen, ":8080");
        assert_eq!(config.endpoint, None);
        assert_eq!(config.max_upload_size, 256 * 1024 * 1024);
        assert_eq!(config.upload_timeout, None);
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let err = GatewayConfig::resolve(CliArgs::default(), lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingBucket);

        let err = GatewayConfig::resolve(CliArgs::default(), lookup_from(&[("BUCKET", "")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingBucket);
    }

    #[test]
    fn test_flags_take_precedence_over_env() {
        let args = CliArgs {
            bucket: Some("from-flag".to_string()),
            region: Some("eu-west-1".to_string()),
            listen: Some("127.0.0.1:9000".to_string()),
            ..Default::default()
        };
        let lookup = lookup_from(&[
            ("BUCKET", "from-env"),
            ("REGION", "ap-south-1"),
            ("S3_PATH", "incoming/"),
            ("HANDLER", "/files"),
        ]);

        let config = GatewayConfig::resolve(args, lookup).unwrap();
        assert_eq!(config.bucket, "from-flag");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.path, "incoming/");
        assert_eq!(config.handler, "/files");
    }

    #[test]
    fn test_handler_path_validation() {
        let args = CliArgs {
            bucket: Some("b".to_string()),
            handler: Some("upload".to_string()),
            ..Default::default()
        };
        assert_eq!(
            GatewayConfig::resolve(args, lookup_from(&[])).unwrap_err(),
            ConfigError::InvalidHandlerPath("upload".to_string())
        );

        let args = CliArgs {
            bucket: Some("b".to_string()),
            handler: Some("/healthz".to_string()),
            ..Default::default()
        };
        assert_eq!(
            GatewayConfig::resolve(args, lookup_from(&[])).unwrap_err(),
            ConfigError::HandlerShadowsHealth("/healthz".to_string())
        );

        for handler in ["/files/:", "/files/*", "/files/:id", "/files/*rest", "/files/{id}"] {
            let args = CliArgs {
                bucket: Some("b".to_string()),
                handler: Some(handler.to_string()),
                ..Default::default()
            };
            assert_eq!(
                GatewayConfig::resolve(args, lookup_from(&[])).unwrap_err(),
                ConfigError::HandlerPathNotLiteral(handler.to_string())
            );
        }

        let args = CliArgs {
            bucket: Some("b".to_string()),
            handler: Some("/api/v1/upload-file".to_string()),
            ..Default::default()
        };
        assert_eq!(
            GatewayConfig::resolve(args, lookup_from(&[])).unwrap().handler,
            "/api/v1/upload-file"
        );
    }

    #[test]
    fn test_numeric_settings() {
        let config = GatewayConfig::resolve(
            CliArgs::default(),
            lookup_from(&[
                ("BUCKET", "b"),
                ("MAX_UPLOAD_SIZE", "1024"),
                ("UPLOAD_TIMEOUT_SECS", "30"),
            ]),
        )
        .unwrap();
        assert_eq!(config.max_upload_size, 1024);
        assert_eq!(config.upload_timeout, Some(Duration::from_secs(30)));

        let config = GatewayConfig::resolve(
            CliArgs::default(),
            lookup_from(&[
                ("BUCKET", "b"),
                ("MAX_UPLOAD_SIZE", "lots"),
                ("UPLOAD_TIMEOUT_SECS", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.max_upload_size, GatewayConfig::DEFAULT_MAX_UPLOAD_SIZE);
        assert_eq!(config.upload_timeout, None);
    }

    #[test]
    fn test_bind_address() {
        let mut config = GatewayConfig::development("b");
        config.listen = ":8080".to_string();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");

        config.listen = "localhost:3000".to_string();
        assert_eq!(config.bind_address(), "localhost:3000");
    }
}
