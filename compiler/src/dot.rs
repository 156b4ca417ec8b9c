// dot.rs — Graphviz DOT rendering of an unrolled graph
//
// Deterministic output: nodes in ID order grouped into one cluster per
// sequence position, edges in ID order after all clusters. Observed
// variables render as boxes, hidden ones as ellipses, and every edge is
// labelled with the parameter table it is tied to.
//
// Preconditions: `graph` is a validated unrolled graph.
// Postconditions: output is valid DOT and identical for identical graphs.
// Failure modes: none.
// Side effects: none.

use std::fmt::Write as _;

use crate::unroll::UnrolledGraph;

/// Render the graph as Graphviz DOT.
pub fn emit_dot(graph: &UnrolledGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", sanitize(&graph.model_name));
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  node [fontname=\"monospace\"];");

    for position in 0..graph.length {
        let _ = writeln!(out, "  subgraph cluster_{position} {{");
        let _ = writeln!(out, "    label=\"t={position}\";");
        for node in graph.nodes.iter().filter(|n| n.position == position) {
            let shape = if node.ty.is_observed() { "box" } else { "ellipse" };
            let _ = writeln!(
                out,
                "    n{} [label=\"{}@{}\", shape={}];",
                node.id.0, node.var, node.position, shape
            );
        }
        let _ = writeln!(out, "  }}");
    }

    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "  n{} -> n{} [label=\"{}\"];",
            edge.parent.0,
            edge.child.0,
            graph.bindings.get(edge.binding).table
        );
    }

    out.push_str("}\n");
    out
}

/// Keep DOT identifiers to alphanumerics and underscores.
fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

// ── Tests ──
