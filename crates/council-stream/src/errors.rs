/// Why a data frame could not be turned into an event.
///
/// Decode errors are local to one frame; the stream keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload after the data prefix is not valid JSON.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
    /// Payload is valid JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,
    /// Object has no string `type` field.
    #[error("payload has no string `type` field")]
    MissingType,
    /// A field the event kind requires is absent or null.
    #[error("`{kind}` event is missing required field `{field}`")]
    MissingField { kind: String, field: &'static str },
    /// A field is present but has the wrong shape.
    #[error("`{kind}` event has an invalid payload: {reason}")]
    InvalidField { kind: String, reason: String },
}

/// Failures of the byte-stream source, before or during streaming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request was rejected locally before anything was sent.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The request could not be sent or no response arrived.
    #[error("{message}")]
    Request { message: String },
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Reading the response body failed mid-stream.
    #[error("Stream error: {message}")]
    Read { message: String },
}

impl TransportError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
