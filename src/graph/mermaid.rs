//! Mermaid flowchart rendering

use crate::domain::EntryKind;
use crate::graph::builder::{sanitize_id, GraphDescription};

/// Escape text placed inside a quoted node label or an edge label.
fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;").replace('|', "#124;")
}

/// Mermaid reference for a node id. The prefix keeps ids such as `end` or
/// `subgraph` from being read as keywords.
fn node_ref(id: &str) -> String {
    format!("n_{id}")
}

/// Render `graph` as Mermaid flowchart text.
///
/// Byte-identical for identical descriptions: buckets and edges are written
/// in the order the description holds them and nothing time-dependent is
/// emitted.
pub fn render_mermaid(graph: &GraphDescription) -> String {
    let mut lines = Vec::with_capacity(graph.node_count() + graph.edges.len() + 8);
    lines.push(format!("flowchart {}", graph.direction.as_str()));
    if !graph.repo.is_empty() {
        lines.push(format!("    %% {}", graph.repo.replace('\n', " ")));
    }

    for bucket in &graph.buckets {
        lines.push(format!(
            "    subgraph group_{}[\"{}\"]",
            sanitize_id(bucket.name),
            escape_label(bucket.name)
        ));
        for node in &bucket.nodes {
            let label = match node.kind {
                EntryKind::Tree => format!("{}/", node.label),
                EntryKind::Blob => node.label.clone(),
            };
            lines.push(format!("        {}[\"{}\"]", node_ref(&node.id), escape_label(&label)));
        }
        lines.push("    end".to_string());
    }

    for edge in &graph.edges {
        if edge.label.is_empty() {
            lines.push(format!("    {} --> {}", node_ref(&edge.from), node_ref(&edge.to)));
        } else {
            lines.push(format!(
                "    {} -->|{}| {}",
                node_ref(&edge.from),
                escape_label(&edge.label),
                node_ref(&edge.to)
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
