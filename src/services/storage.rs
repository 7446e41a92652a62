use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// Everything a single-shot put needs, declared up front.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub content_length: i64,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, object: PutObject) -> Result<()>;
}

/// S3 (or S3-compatible) store. Holds no client: every put loads the default
/// credential chain and builds its own.
pub struct S3ObjectStore {
    region: String,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    pub fn new(region: String, endpoint: Option<String>) -> Self {
        Self { region, endpoint }
    }

    async fn connect(&self) -> Client {
        let mut loader = aws_config::from_env().region(Region::new(self.region.clone()));
        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        // Custom endpoints are usually MinIO and friends, which want path-style keys.
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(self.endpoint.is_some())
            .build();

        Client::from_conf(s3_config)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, object: PutObject) -> Result<()> {
        let client = self.connect().await;

        let res = client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_length(object.content_length)
            .content_type(object.content_type)
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                object.bucket,
                object.key,
                e
            );
            return Err(anyhow::anyhow!("{}", DisplayErrorContext(&e)));
        }
        Ok(())
    }
}
