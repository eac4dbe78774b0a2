use std::fmt;

use crate::event::Node;

/// Which session shape the backend is producing.
///
/// Derived from the nodes on every read; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolVariant {
    /// plan → research → critique → synthesis.
    Standard,
    /// proposal / refinement / test_cases / verdict.
    Alternate,
}

impl ProtocolVariant {
    /// Any proposal-flow node makes the whole session `Alternate`, even when
    /// standard-flow kinds are present too.
    pub fn classify(nodes: &[Node]) -> Self {
        if nodes.iter().any(|node| node.kind.is_alternate_only()) {
            Self::Alternate
        } else {
            Self::Standard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Alternate => "alternate",
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
