use std::fmt;

use tracing::{debug, info, warn};

use crate::attachment::Attachment;
use crate::event::{Event, Node, NodeKind};
use crate::projection::{self, Projection};
use crate::protocol::ProtocolVariant;

/// Lifecycle of one streaming call. `Done` and `Error` are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Streaming,
    Done,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Streaming)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reconstructed session: ordered nodes plus terminal status.
///
/// Lives for one streaming call and is never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    session_id: uuid::Uuid,
    nodes: Vec<Node>,
    status: SessionStatus,
    error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4(),
            nodes: Vec::new(),
            status: SessionStatus::Streaming,
            error: None,
        }
    }

    /// Client-side id used to correlate log lines for this stream.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Nodes in arrival order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Reason for an `Error` status.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::classify(&self.nodes)
    }

    pub fn projection(&self) -> Projection<'_> {
        Projection::of(&self.nodes)
    }

    /// Sum of every reported node cost.
    pub fn total_cost(&self) -> f64 {
        projection::total_cost(&self.nodes)
    }

    /// Conversation id reported by the latest node that carried one.
    pub fn conversation_id(&self) -> Option<&str> {
        self.nodes
            .iter()
            .rev()
            .find_map(|node| node.conversation_id.as_deref())
    }

    /// Every warning reported so far, in arrival order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .flat_map(|node| node.warnings.iter().map(String::as_str))
    }

    /// Brings `self` up to date with `newer`, a later state of the same
    /// session, cloning only the nodes appended since.
    pub(crate) fn catch_up(&mut self, newer: &SessionState) {
        if let Some(appended) = newer.nodes.get(self.nodes.len()..) {
            self.nodes.extend_from_slice(appended);
        }
        if self.status != newer.status {
            self.status = newer.status;
            self.error.clone_from(&newer.error);
        }
    }

    /// Attachments listed on the first `root` node.
    pub fn root_attachments(&self) -> &[Attachment] {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeKind::Root)
            .map(|node| node.attachments.as_slice())
            .unwrap_or_default()
    }
}

/// What [`SessionBuilder::apply`] did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The node was appended.
    Appended,
    /// The error event moved the session to `Error`.
    Failed,
    /// The session was already terminal; the event was dropped.
    Ignored,
}

/// Folds decoded events into a [`SessionState`].
///
/// The builder is the only writer of its state. Once the status is terminal
/// every mutation is a no-op, so late events cannot change a finished session.
#[derive(Debug)]
pub struct SessionBuilder {
    state: SessionState,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn apply(&mut self, event: Event) -> Applied {
        match event {
            Event::Node(node) => {
                if self.append(node) {
                    Applied::Appended
                } else {
                    Applied::Ignored
                }
            }
            Event::Error { message } => {
                if self.fail(message) {
                    Applied::Failed
                } else {
                    Applied::Ignored
                }
            }
        }
    }

    /// Appends a node. Returns `false` if the session is already terminal.
    pub fn append(&mut self, node: Node) -> bool {
        if self.state.is_terminal() {
            debug!(session_id = %self.state.session_id, node_id = node.id, kind = %node.kind, status = %self.state.status, "dropping node after terminal status");
            return false;
        }
        debug!(session_id = %self.state.session_id, node_id = node.id, kind = %node.kind, "node appended");
        self.state.nodes.push(node);
        true
    }

    /// Moves the session to `Error`. Returns `false` if already terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let message = message.into();
        warn!(session_id = %self.state.session_id, nodes = self.state.nodes.len(), error = %message, "session failed");
        self.state.status = SessionStatus::Error;
        self.state.error = Some(message);
        true
    }

    /// Moves the session to `Done`. Returns `false` if already terminal.
    pub fn complete(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        info!(session_id = %self.state.session_id, nodes = self.state.nodes.len(), variant = %self.state.variant(), "session completed");
        self.state.status = SessionStatus::Done;
        true
    }
}
