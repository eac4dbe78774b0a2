use std::sync::Arc;

use tracing::{error, info};

use crate::config::ClientConfig;
use crate::errors::ConfigError;
use crate::request::{CouncilRequest, StreamRequest, SuperChatRequest};
use crate::stream::SessionStream;
use crate::transport::{HttpTransport, Transport};

/// Entry point for opening session streams against the deliberation backend.
#[derive(Clone)]
pub struct CouncilClient {
    transport: Arc<dyn Transport>,
}

impl CouncilClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client over HTTP with the given connection settings.
    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Client over HTTP configured from `COUNCIL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Opens a session stream.
    ///
    /// Never fails outright: an invalid request, a connection failure or a
    /// non-success status yields a session that is already in the `Error`
    /// state, carrying the failure message.
    pub async fn stream(&self, request: impl Into<StreamRequest>) -> SessionStream {
        let request = request.into();
        if let Err(err) = request.validate() {
            error!(path = request.path(), error = %err, "rejected session request");
            return SessionStream::failed(err);
        }

        match self.transport.open(&request).await {
            Ok(bytes) => {
                info!(path = request.path(), "session stream opened");
                SessionStream::from_bytes(bytes)
            }
            Err(err) => {
                error!(path = request.path(), error = %err, "failed to open session stream");
                SessionStream::failed(err)
            }
        }
    }

    pub async fn stream_council(&self, request: CouncilRequest) -> SessionStream {
        self.stream(request).await
    }

    pub async fn stream_superchat(&self, request: SuperChatRequest) -> SessionStream {
        self.stream(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::errors::TransportError;
    use crate::session::SessionStatus;
    use crate::transport::ByteStream;

    /// Replays canned frames and records the requests it receives.
    struct FakeTransport {
        frames: Vec<&'static str>,
        failure: Option<TransportError>,
        seen: Mutex<Vec<StreamRequest>>,
    }

    impl FakeTransport {
        fn replaying(frames: Vec<&'static str>) -> Self {
            Self {
                frames,
                failure: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: TransportError) -> Self {
            Self {
                frames: Vec::new(),
                failure: Some(err),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Transport for FakeTransport {
        async fn open(&self, request: &StreamRequest) -> Result<ByteStream, TransportError> {
            self.seen.lock().expect("lock").push(request.clone());
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            let chunks: Vec<Result<bytes::Bytes, TransportError>> = self
                .frames
                .iter()
                .map(|f| Ok(bytes::Bytes::from_static(f.as_bytes())))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    #[tokio::test]
    async fn streams_council_run_to_done() {
        let transport = Arc::new(FakeTransport::replaying(vec![
            "data: {\"id\":0,\"type\":\"root\",\"content\":\"q\"}\n",
            "data: {\"id\":1,\"type\":\"plan\",\"model\":\"m\",\"content\":\"x\"}\n",
        ]));
        let client = CouncilClient::new(transport.clone());
        let state = client
            .stream_council(CouncilRequest::new("q", ["m"], "chair"))
            .await
            .finish()
            .await;

        assert_eq!(state.status(), SessionStatus::Done);
        assert_eq!(state.nodes().len(), 2);
        let seen = transport.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path(), "/council/run");
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_transport() {
        let transport = Arc::new(FakeTransport::replaying(Vec::new()));
        let client = CouncilClient::new(transport.clone());
        let session = client
            .stream_superchat(SuperChatRequest::new("", ["m"], "chair"))
            .await;

        assert_eq!(session.session().status(), SessionStatus::Error);
        assert!(transport.seen.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn http_status_failure_is_an_error_session() {
        let client = CouncilClient::new(Arc::new(FakeTransport::failing(
            TransportError::status(500, "Internal Server Error"),
        )));
        let state = client
            .stream(SuperChatRequest::new("hi", ["m"], "chair"))
            .await
            .finish()
            .await;

        assert_eq!(state.status(), SessionStatus::Error);
        assert_eq!(state.error(), Some("HTTP 500: Internal Server Error"));
        assert!(state.nodes().is_empty());
    }
}
