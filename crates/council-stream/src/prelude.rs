//! Common imports for typical client usage.
pub use crate::{
    ClientConfig, ConfigError, CouncilClient, CouncilRequest, Event, LiveSession, Node, NodeKind,
    Projection, ProtocolVariant, SessionState, SessionStatus, SessionStream, StreamRequest,
    SuperChatRequest, TransportError,
};
