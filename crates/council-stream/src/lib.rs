//! Streaming client for a multi-agent deliberation backend.
//!
//! The backend answers a prompt with one long-lived response body of
//! `data: <json>` lines. This crate splits that body into frames, decodes the
//! frames into typed events, folds the events into a [`SessionState`], and
//! projects the state into the view that matches its protocol variant.
//!
//! # Usage
//!
//! ```no_run
//! use council_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ConfigError> {
//! let client = CouncilClient::from_env()?;
//! let mut session = client
//!     .stream(CouncilRequest::new("Design a rate limiter", ["model-a", "model-b"], "chair"))
//!     .await;
//!
//! while let Some(event) = session.next_event().await {
//!     if let Event::Node(node) = event {
//!         println!("{} #{}", node.kind, node.id);
//!     }
//! }
//!
//! let state = session.finish().await;
//! println!("{} nodes, status {}", state.nodes().len(), state.status());
//! # Ok(())
//! # }
//! ```

/// Attachment metadata carried by root nodes.
pub mod attachment;
/// HTTP-backed entry point.
pub mod client;
/// Connection settings.
pub mod config;
/// Frame-to-event decoding.
pub mod decoder;
/// Public error types.
pub mod errors;
/// Event and node model.
pub mod event;
/// Newline framing over raw chunks.
pub mod frame;
/// Process-wide logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Grouped and chronological views over a session's nodes.
pub mod projection;
/// Standard vs proposal/verdict flow detection.
pub mod protocol;
/// Bodies of the stream-initiating requests.
pub mod request;
/// Session state and the builder that folds events into it.
pub mod session;
/// Async event and session streams.
pub mod stream;
/// Byte-stream sources.
pub mod transport;
mod wire;

pub use attachment::{Attachment, AttachmentKind, format_file_size};
pub use client::CouncilClient;
pub use config::ClientConfig;
pub use decoder::{DATA_PREFIX, EventDecoder, decode_frame, decode_value};
pub use errors::{ConfigError, DecodeError, TransportError};
pub use event::{Event, Node, NodeKind};
pub use frame::FrameSplitter;
pub use observability::init_observability;
pub use projection::{
    ChronologicalView, DEFAULT_CRITIC_ROLE, Projection, RoleLabel, Section, Stage, StandardView,
    TimelineEntry, total_cost,
};
pub use protocol::ProtocolVariant;
pub use request::{CouncilRequest, DEFAULT_MAX_ITERATIONS, StreamRequest, SuperChatRequest};
pub use session::{Applied, SessionBuilder, SessionState, SessionStatus};
pub use stream::{LiveSession, SessionStream, event_stream};
pub use transport::{ByteStream, HttpTransport, Transport};
