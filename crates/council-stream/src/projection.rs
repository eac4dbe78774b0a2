//! Read-only views over a session's node list.
//!
//! Both views borrow the nodes and can be rebuilt on every render tick while
//! the stream is still running; a view over a prefix of the nodes is a valid
//! view.

use crate::event::{Node, NodeKind};
use crate::protocol::ProtocolVariant;

/// Role shown for a critique whose model string has no `Role (model)` form.
pub const DEFAULT_CRITIC_ROLE: &str = "Critic";

/// Sum of every node's cost, counting a missing cost as zero.
pub fn total_cost(nodes: &[Node]) -> f64 {
    nodes.iter().map(Node::cost_or_zero).sum()
}

/// The view that matches the session's protocol variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection<'a> {
    Standard(StandardView<'a>),
    Alternate(ChronologicalView<'a>),
}

impl<'a> Projection<'a> {
    pub fn of(nodes: &'a [Node]) -> Self {
        match ProtocolVariant::classify(nodes) {
            ProtocolVariant::Standard => Self::Standard(StandardView::of(nodes)),
            ProtocolVariant::Alternate => Self::Alternate(ChronologicalView::of(nodes)),
        }
    }

    pub fn variant(&self) -> ProtocolVariant {
        match self {
            Self::Standard(_) => ProtocolVariant::Standard,
            Self::Alternate(_) => ProtocolVariant::Alternate,
        }
    }
}

/// Stage headings of the standard flow, in presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Plan,
    Research,
    Critique,
    Synthesis,
}

impl Stage {
    pub fn title(self) -> &'static str {
        match self {
            Self::Plan => "Research Plan",
            Self::Research => "Council Research",
            Self::Critique => "Peer Critique",
            Self::Synthesis => "Final Synthesis",
        }
    }
}

/// A non-empty group of nodes under one stage heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Section<'a> {
    pub stage: Stage,
    pub nodes: Vec<&'a Node>,
}

/// Nodes grouped by stage for the standard flow.
///
/// Only the first `root`, `plan` and `synthesis` are used; every `research`
/// and `critique` is kept in arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StandardView<'a> {
    /// Source of the prompt attachments; not rendered as a stage.
    pub root: Option<&'a Node>,
    pub plan: Option<&'a Node>,
    pub research: Vec<&'a Node>,
    pub critiques: Vec<&'a Node>,
    pub synthesis: Option<&'a Node>,
}

impl<'a> StandardView<'a> {
    pub fn of(nodes: &'a [Node]) -> Self {
        let mut view = Self::default();
        for node in nodes {
            match node.kind {
                NodeKind::Root => {
                    view.root.get_or_insert(node);
                }
                NodeKind::Plan => {
                    view.plan.get_or_insert(node);
                }
                NodeKind::Research => view.research.push(node),
                NodeKind::Critique => view.critiques.push(node),
                NodeKind::Synthesis => {
                    view.synthesis.get_or_insert(node);
                }
                NodeKind::Proposal
                | NodeKind::Refinement
                | NodeKind::TestCases
                | NodeKind::Verdict
                | NodeKind::Unknown(_) => {}
            }
        }
        view
    }

    /// Non-empty stages in plan → research → critique → synthesis order.
    pub fn sections(&self) -> Vec<Section<'a>> {
        [
            (Stage::Plan, self.plan.into_iter().collect::<Vec<_>>()),
            (Stage::Research, self.research.clone()),
            (Stage::Critique, self.critiques.clone()),
            (Stage::Synthesis, self.synthesis.into_iter().collect()),
        ]
        .into_iter()
        .filter(|(_, nodes)| !nodes.is_empty())
        .map(|(stage, nodes)| Section { stage, nodes })
        .collect()
    }
}

/// `Role (model)` decomposition of a critique's model string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleLabel<'a> {
    pub role: &'a str,
    pub model: &'a str,
}

impl<'a> RoleLabel<'a> {
    /// `"Skeptic (gpt-x)"` → role `Skeptic`, model `gpt-x`. Without a
    /// parenthesis the role is [`DEFAULT_CRITIC_ROLE`] and the whole string
    /// is the model.
    pub fn parse(model: &'a str) -> Self {
        let Some(open) = model.find('(') else {
            return Self {
                role: DEFAULT_CRITIC_ROLE,
                model: model.trim(),
            };
        };
        let role = model[..open].trim();
        let inner = &model[open + 1..];
        let inner = match inner.rfind(')') {
            Some(close) => &inner[..close],
            None => inner,
        };
        Self {
            role: if role.is_empty() {
                DEFAULT_CRITIC_ROLE
            } else {
                role
            },
            model: inner.trim(),
        }
    }
}

/// One row of the chronological view.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntry<'a> {
    pub node: &'a Node,
    /// Set for critiques.
    pub role: Option<RoleLabel<'a>>,
    /// Set for verdicts: the cost of the whole session so far.
    pub total_cost: Option<f64>,
}

/// Nodes in id order for the proposal/verdict flow, without `root` and
/// without kinds this client does not know.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChronologicalView<'a> {
    pub entries: Vec<TimelineEntry<'a>>,
}

impl<'a> ChronologicalView<'a> {
    pub fn of(nodes: &'a [Node]) -> Self {
        let session_cost = total_cost(nodes);
        let mut entries: Vec<TimelineEntry<'a>> = nodes
            .iter()
            .filter(|node| !matches!(node.kind, NodeKind::Root | NodeKind::Unknown(_)))
            .map(|node| TimelineEntry {
                node,
                role: matches!(node.kind, NodeKind::Critique)
                    .then(|| RoleLabel::parse(node.model_str())),
                total_cost: matches!(node.kind, NodeKind::Verdict).then_some(session_cost),
            })
            .collect();
        // stable: equal ids keep arrival order
        entries.sort_by_key(|entry| entry.node.id);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> Vec<&'a NodeKind> {
        self.entries
            .iter()
            .map(|entry| {
                let node: &'a Node = entry.node;
                &node.kind
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: i64, kind: NodeKind, model: &str) -> Node {
        Node::new(id, kind).with_model(model).with_content("c")
    }

    #[test]
    fn standard_view_groups_by_stage() {
        let nodes = vec![
            Node::new(1, NodeKind::Root),
            stage(2, NodeKind::Plan, "planner"),
            stage(3, NodeKind::Research, "a"),
            stage(4, NodeKind::Research, "b"),
            stage(5, NodeKind::Critique, "a"),
            stage(6, NodeKind::Plan, "late-planner"),
            stage(7, NodeKind::Synthesis, "chair"),
            Node::new(8, NodeKind::Unknown("brainstorm".into())),
        ];
        let view = StandardView::of(&nodes);
        assert_eq!(view.root.map(|n| n.id), Some(1));
        assert_eq!(view.plan.map(|n| n.model_str()), Some("planner"));
        assert_eq!(view.research.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(view.critiques.len(), 1);
        assert_eq!(view.synthesis.map(|n| n.id), Some(7));

        let stages: Vec<Stage> = view.sections().iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Plan, Stage::Research, Stage::Critique, Stage::Synthesis]
        );
    }

    #[test]
    fn sections_order_is_fixed_not_arrival() {
        let nodes = vec![
            stage(1, NodeKind::Synthesis, "chair"),
            stage(2, NodeKind::Critique, "a"),
            stage(3, NodeKind::Plan, "planner"),
        ];
        let stages: Vec<Stage> = StandardView::of(&nodes)
            .sections()
            .iter()
            .map(|s| s.stage)
            .collect();
        assert_eq!(stages, vec![Stage::Plan, Stage::Critique, Stage::Synthesis]);
    }

    #[test]
    fn partial_standard_view_only_lists_present_stages() {
        let nodes = vec![stage(1, NodeKind::Plan, "planner")];
        let sections = StandardView::of(&nodes).sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].stage.title(), "Research Plan");
    }

    #[test]
    fn role_label_splits_role_and_model() {
        assert_eq!(
            RoleLabel::parse("Skeptic (gpt-x)"),
            RoleLabel {
                role: "Skeptic",
                model: "gpt-x"
            }
        );
        assert_eq!(
            RoleLabel::parse("openai/gpt-4o"),
            RoleLabel {
                role: DEFAULT_CRITIC_ROLE,
                model: "openai/gpt-4o"
            }
        );
        assert_eq!(
            RoleLabel::parse("Devil's Advocate (vendor/model (beta))"),
            RoleLabel {
                role: "Devil's Advocate",
                model: "vendor/model (beta)"
            }
        );
        assert_eq!(RoleLabel::parse("(m)").role, DEFAULT_CRITIC_ROLE);
        assert_eq!(RoleLabel::parse("Tester (m").model, "m");
        assert_eq!(RoleLabel::parse("").model, "");
    }

    #[test]
    fn chronological_view_sorts_by_id_and_skips_root() {
        let nodes = vec![
            Node::new(1, NodeKind::Root),
            Node::new(5, NodeKind::Verdict).with_content("ship it"),
            Node::new(2, NodeKind::Proposal).with_content("p"),
            Node::new(4, NodeKind::Unknown("brainstorm".into())),
            Node::new(3, NodeKind::Critique).with_model("Skeptic (gpt-x)").with_content("c"),
        ];
        let view = ChronologicalView::of(&nodes);
        let ids: Vec<i64> = view.entries.iter().map(|e| e.node.id).collect();
        assert_eq!(ids, vec![2, 3, 5]);
        assert_eq!(
            view.entries[1].role,
            Some(RoleLabel {
                role: "Skeptic",
                model: "gpt-x"
            })
        );
        assert_eq!(view.entries[0].role, None);
        assert_eq!(view.entries[0].total_cost, None);
    }

    #[test]
    fn equal_ids_keep_arrival_order() {
        let nodes = vec![
            Node::new(2, NodeKind::Refinement).with_content("second"),
            Node::new(2, NodeKind::Proposal).with_content("first"),
            Node::new(1, NodeKind::Proposal).with_content("zero"),
        ];
        let view = ChronologicalView::of(&nodes);
        let contents: Vec<&str> = view.entries.iter().map(|e| e.node.content_str()).collect();
        assert_eq!(contents, vec!["zero", "second", "first"]);
    }

    #[test]
    fn verdict_total_cost_covers_every_node() {
        let nodes = vec![
            Node::new(1, NodeKind::Root).with_cost(0.5),
            Node::new(2, NodeKind::Proposal).with_content("p").with_cost(0.25),
            Node::new(3, NodeKind::Refinement).with_content("r"),
            Node::new(4, NodeKind::Verdict).with_content("v").with_cost(0.125),
        ];
        let view = ChronologicalView::of(&nodes);
        let verdict = view.entries.last().expect("verdict entry");
        assert_eq!(verdict.node.kind, NodeKind::Verdict);
        assert_eq!(verdict.total_cost, Some(0.875));
        assert_eq!(total_cost(&nodes), 0.875);
    }

    #[test]
    fn total_cost_of_costless_nodes_is_zero() {
        let nodes = vec![Node::new(1, NodeKind::Verdict).with_content("v")];
        assert_eq!(total_cost(&nodes), 0.0);
        assert_eq!(ChronologicalView::of(&nodes).entries[0].total_cost, Some(0.0));
    }

    #[test]
    fn projection_follows_the_classifier() {
        let standard = vec![stage(1, NodeKind::Plan, "p")];
        assert_eq!(Projection::of(&standard).variant(), ProtocolVariant::Standard);

        let mixed = vec![
            stage(1, NodeKind::Critique, "Skeptic (m)"),
            Node::new(2, NodeKind::Proposal).with_content("p"),
        ];
        match Projection::of(&mixed) {
            Projection::Alternate(view) => assert_eq!(view.len(), 2),
            other => panic!("expected alternate projection, got {other:?}"),
        }
    }
}
