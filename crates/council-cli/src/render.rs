//! Plain-text rendering of nodes and session projections.

use std::fmt::Write as _;

use council_stream::projection::{ChronologicalView, RoleLabel, StandardView};
use council_stream::{Node, NodeKind, Projection, SessionState, format_file_size};

/// One-line header for a node as it arrives.
pub fn node_header(node: &Node) -> String {
    let mut line = format!("[#{} {}]", node.id, node.kind);
    if let Some(model) = node.model.as_deref().filter(|m| !m.is_empty()) {
        let _ = write!(line, " {model}");
    }
    if let Some(cost) = node.actual_cost {
        let _ = write!(line, " (${cost:.4})");
    }
    line
}

/// Final view of the session, shaped by its protocol variant.
pub fn session_summary(state: &SessionState) -> String {
    let mut out = String::new();
    let nodes = state.nodes();
    if let Some(root) = nodes.iter().find(|n| n.kind == NodeKind::Root) {
        write_root(&mut out, root);
    }
    match state.projection() {
        Projection::Standard(view) => write_standard(&mut out, &view),
        Projection::Alternate(view) => write_chronological(&mut out, &view),
    }

    let warnings: Vec<&str> = state.warnings().collect();
    if !warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }
    if let Some(conversation) = state.conversation_id() {
        let _ = writeln!(out, "\nConversation: {conversation}");
    }
    let _ = writeln!(out, "\nTotal cost: ${:.4}", state.total_cost());
    let _ = write!(out, "Status: {}", state.status());
    if let Some(error) = state.error() {
        let _ = write!(out, " ({error})");
    }
    out.push('\n');
    out
}

fn write_root(out: &mut String, root: &Node) {
    let _ = writeln!(out, "== Prompt ==\n{}", root.content_str());
    if root.attachments.is_empty() {
        return;
    }
    let _ = writeln!(out, "Attachments:");
    for attachment in &root.attachments {
        let _ = writeln!(
            out,
            "  - {} [{}] {}",
            attachment.filename,
            attachment.kind(),
            format_file_size(attachment.file_size)
        );
    }
}

fn write_standard(out: &mut String, view: &StandardView<'_>) {
    for section in view.sections() {
        let _ = writeln!(out, "\n== {} ==", section.stage.title());
        for node in section.nodes {
            let _ = writeln!(out, "-- {} --\n{}", node.model_str(), node.content_str());
        }
    }
}

fn write_chronological(out: &mut String, view: &ChronologicalView<'_>) {
    for entry in &view.entries {
        let node = entry.node;
        let _ = write!(out, "\n== {} #{} ==", node.kind, node.id);
        match entry.role {
            Some(RoleLabel { role, model }) => {
                let _ = write!(out, " {role}: {model}");
            }
            None if !node.model_str().is_empty() => {
                let _ = write!(out, " {}", node.model_str());
            }
            None => {}
        }
        if let Some(total) = entry.total_cost {
            let _ = write!(out, " (session total ${total:.4})");
        }
        let _ = writeln!(out, "\n{}", node.content_str());
    }
}
