use std::pin::Pin;

use futures::StreamExt as _;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{ConfigError, TransportError};
use crate::request::StreamRequest;

/// Raw response body of a session stream, chunked however the network
/// delivers it.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// Source of session byte streams.
///
/// The HTTP implementation is [`HttpTransport`]; tests plug in canned streams.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response body once the backend has
    /// accepted it with a success status.
    async fn open(&self, request: &StreamRequest) -> Result<ByteStream, TransportError>;
}

/// Transport that POSTs JSON to the backend and streams the response body.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Creates a transport from `COUNCIL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> Result<ByteStream, TransportError> {
        let url = self.config.endpoint(request.path());
        debug!(url = %url, "opening session stream");

        let mut http_req = self.client.post(&url).json(request);
        if let Some(token) = self.config.token.as_deref() {
            http_req = http_req.bearer_auth(token);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| TransportError::request(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::status(status.as_u16(), body));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::read(e.to_string())));
        Ok(Box::pin(body))
    }
}
