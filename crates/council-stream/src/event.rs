use std::fmt;

use serde::{Serialize, Serializer};

use crate::attachment::Attachment;

/// Node kinds emitted by the deliberation backend.
///
/// The first five belong to the standard council flow, the next four to the
/// proposal/verdict flow. Anything else is kept as [`NodeKind::Unknown`] so a
/// newer backend does not break older clients.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Plan,
    Research,
    Critique,
    Synthesis,
    Proposal,
    Refinement,
    TestCases,
    Verdict,
    Unknown(String),
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "root" => Self::Root,
            "plan" => Self::Plan,
            "research" => Self::Research,
            "critique" => Self::Critique,
            "synthesis" => Self::Synthesis,
            "proposal" => Self::Proposal,
            "refinement" => Self::Refinement,
            "test_cases" => Self::TestCases,
            "verdict" => Self::Verdict,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Plan => "plan",
            Self::Research => "research",
            Self::Critique => "critique",
            Self::Synthesis => "synthesis",
            Self::Proposal => "proposal",
            Self::Refinement => "refinement",
            Self::TestCases => "test_cases",
            Self::Verdict => "verdict",
            Self::Unknown(tag) => tag,
        }
    }

    /// Kinds that only appear in the proposal/verdict flow.
    pub fn is_alternate_only(&self) -> bool {
        matches!(
            self,
            Self::Proposal | Self::Refinement | Self::TestCases | Self::Verdict
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Kinds whose payload must name the producing model.
    pub(crate) fn requires_model(&self) -> bool {
        matches!(
            self,
            Self::Plan | Self::Research | Self::Critique | Self::Synthesis
        )
    }

    /// Kinds whose payload must carry content.
    pub(crate) fn requires_content(&self) -> bool {
        !matches!(self, Self::Root | Self::Unknown(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One committed step of a deliberation session.
///
/// Nodes are never mutated after they are appended to a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    /// Ordering key assigned by the backend.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_filenames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_sent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Payload fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    /// Creates a node with only an id and a kind set.
    pub fn new(id: i64, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            model: None,
            content: None,
            actual_cost: None,
            attachment_filenames: None,
            prompt_sent: None,
            warnings: Vec::new(),
            conversation_id: None,
            attachments: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.actual_cost = Some(cost);
        self
    }

    pub fn model_str(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Cost of this node, zero when the backend did not report one.
    pub fn cost_or_zero(&self) -> f64 {
        self.actual_cost.unwrap_or(0.0)
    }
}

/// A decoded record from one data frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A session step to append.
    Node(Node),
    /// Producer-signalled failure; the stream ends here.
    Error { message: String },
}

impl Event {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_kind() {
        for tag in [
            "root",
            "plan",
            "research",
            "critique",
            "synthesis",
            "proposal",
            "refinement",
            "test_cases",
            "verdict",
            "brainstorm",
        ] {
            assert_eq!(NodeKind::from_tag(tag).as_str(), tag);
        }
        assert!(NodeKind::from_tag("brainstorm").is_unknown());
    }

    #[test]
    fn only_proposal_flow_kinds_are_alternate() {
        assert!(NodeKind::TestCases.is_alternate_only());
        assert!(NodeKind::Verdict.is_alternate_only());
        assert!(!NodeKind::Critique.is_alternate_only());
        assert!(!NodeKind::Unknown("verdict_v2".into()).is_alternate_only());
    }

    #[test]
    fn node_serializes_with_wire_field_names() {
        let node = Node::new(3, NodeKind::TestCases)
            .with_content("cases")
            .with_cost(0.25);
        let value = serde_json::to_value(&node).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "type": "test_cases",
                "content": "cases",
                "actual_cost": 0.25
            })
        );
    }

    #[test]
    fn missing_cost_counts_as_zero() {
        assert_eq!(Node::new(1, NodeKind::Plan).cost_or_zero(), 0.0);
        assert_eq!(Node::new(1, NodeKind::Plan).with_cost(1.5).cost_or_zero(), 1.5);
    }
}
