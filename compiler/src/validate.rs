// validate.rs — Post-unroll structural validation
//
// Independent re-check of the finished graph against the template set:
// global acyclicity (Kahn), completeness of every position against its
// governing template, and edge direction sanity. The earlier passes should
// make these defects impossible; this pass exists so that a bug upstream
// surfaces as a diagnostic instead of a silently wrong graph.
//
// Preconditions: `graph` produced by `unroll` from `frame_set`.
// Postconditions: empty result means the graph satisfies all structural laws.
// Failure modes: none (defects are reported, not raised).
// Side effects: none.

use std::collections::VecDeque;

use crate::diag::{codes, DiagLevel, Diagnostic};
use crate::frame::FrameSet;
use crate::unroll::UnrolledGraph;

/// Validate the unrolled graph against its template set.
pub fn validate(graph: &UnrolledGraph, frame_set: &FrameSet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let fallback = frame_set.boundary().span;
    // dangling edges make the index-based checks meaningless, so gate on them
    if check_edge_refs(graph, fallback, &mut diagnostics) {
        check_acyclic(graph, fallback, &mut diagnostics);
        check_edge_direction(graph, fallback, &mut diagnostics);
    }
    check_completeness(graph, frame_set, &mut diagnostics);
    diagnostics
}

/// Every edge endpoint must name an existing node. Returns false when any
/// edge dangles.
fn check_edge_refs(
    graph: &UnrolledGraph,
    fallback: crate::ast::Span,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let n = graph.nodes.len() as u32;
    let mut ok = true;
    for edge in &graph.edges {
        if edge.parent.0 >= n || edge.child.0 >= n {
            diagnostics.push(defect(
                fallback,
                format!("edge {:?} references a node that does not exist", edge.id),
            ));
            ok = false;
        }
    }
    ok
}

fn defect(span: crate::ast::Span, message: String) -> Diagnostic {
    Diagnostic::new(DiagLevel::Error, span, message).with_code(codes::E0501)
}

/// Kahn's algorithm over the whole graph. Any unprocessed remainder is a
/// cycle that escaped template-level detection.
fn check_acyclic(
    graph: &UnrolledGraph,
    fallback: crate::ast::Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let n = graph.nodes.len();
    let mut in_degree = vec![0usize; n];
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in &graph.edges {
        in_degree[edge.child.0 as usize] += 1;
        out[edge.parent.0 as usize].push(edge.child.0 as usize);
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut processed = 0usize;
    while let Some(node) = queue.pop_front() {
        processed += 1;
        for &next in &out[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if processed != n {
        let stuck: Vec<String> = graph
            .nodes
            .iter()
            .filter(|node| in_degree[node.id.0 as usize] > 0)
            .map(|node| format!("{}@{}", node.var, node.position))
            .collect();
        diagnostics.push(defect(
            fallback,
            format!(
                "unrolled graph contains a dependency cycle among: {}",
                stuck.join(", ")
            ),
        ));
    }
}

/// Every position must hold exactly the variables of its governing template,
/// with matching types and edge counts.
fn check_completeness(
    graph: &UnrolledGraph,
    frame_set: &FrameSet,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for position in 0..graph.length {
        let template = frame_set.template_for(position);
        for var in &template.variables {
            // scan the node list rather than trusting the lookup index
            let node = match graph
                .nodes
                .iter()
                .find(|n| n.var == var.name && n.position == position)
            {
                Some(node) => node,
                None => {
                    diagnostics.push(defect(
                        var.name_span,
                        format!("missing node for '{}' at position {}", var.name, position),
                    ));
                    continue;
                }
            };
            if node.ty != var.ty {
                diagnostics.push(defect(
                    var.name_span,
                    format!(
                        "node '{}@{}' does not match its template type",
                        var.name, position
                    ),
                ));
            }
            let expected = var.parents.len();
            let actual = graph.in_degree(node.id);
            if actual != expected {
                diagnostics.push(defect(
                    var.name_span,
                    format!(
                        "node '{}@{}' has {} incoming edges but its template declares {}",
                        var.name, position, actual, expected
                    ),
                ));
            }
        }
    }

    let expected_nodes = graph.length as usize * frame_set.var_count();
    if graph.nodes.len() != expected_nodes {
        diagnostics.push(defect(
            frame_set.boundary().span,
            format!(
                "graph holds {} nodes but {} positions x {} variables requires {}",
                graph.nodes.len(),
                graph.length,
                frame_set.var_count(),
                expected_nodes
            ),
        ));
    }
}

/// Edges never point from a later position to an earlier one's child slot
/// backwards: a parent's position must not exceed its child's.
fn check_edge_direction(
    graph: &UnrolledGraph,
    fallback: crate::ast::Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for edge in &graph.edges {
        let parent = graph.node_ref(edge.parent);
        let child = graph.node_ref(edge.child);
        if parent.position > child.position {
            diagnostics.push(defect(
                fallback,
                format!(
                    "edge from {}@{} to {}@{} runs backwards in time",
                    parent.var, parent.position, child.var, child.position
                ),
            ));
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind_parameters;
    use crate::frame::build_frames;
    use crate::parser::parse;
    use crate::unroll::unroll;

    fn build(source: &str, length: u32) -> (UnrolledGraph, FrameSet) {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty());
        let frames = build_frames(&parsed.file.unwrap());
        assert!(frames.diagnostics.is_empty());
        let frame_set = frames.frame_set.unwrap();
        let bound = bind_parameters(&frame_set).bound.unwrap();
        let graph = unroll(&frame_set, &bound, length).unwrap();
        (graph, frame_set)
    }

    const TWO_FRAME: &str = r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: seg {
    type: discrete hidden cardinality 4;
    conditionalparents: nil using DenseCPT("start_seg");
  }
  variable: tn {
    type: continuous observed 0:0;
    conditionalparents: seg(0) using mixture collection("col_tn");
  }
}
frame: 1 {
  variable: seg {
    type: discrete hidden cardinality 4;
    conditionalparents: seg(-1) using DenseCPT("seg_seg");
  }
  variable: tn {
    type: continuous observed 0:0;
    conditionalparents: seg(-1) using mixture collection("col_tn");
  }
}
chunk 1:1
"#;

    #[test]
    fn well_formed_graph_passes() {
        let (graph, frame_set) = build(TWO_FRAME, 4);
        assert!(validate(&graph, &frame_set).is_empty());
    }

    #[test]
    fn single_position_graph_passes() {
        let (graph, frame_set) = build(TWO_FRAME, 1);
        assert!(validate(&graph, &frame_set).is_empty());
    }

    #[test]
    fn tampered_edge_count_is_reported() {
        let (mut graph, frame_set) = build(TWO_FRAME, 3);
        graph.edges.pop();
        let diags = validate(&graph, &frame_set);
        assert!(!diags.is_empty());
        assert_eq!(diags[0].code, Some(codes::E0501));
        assert!(diags[0].message.contains("incoming edges"));
    }

    #[test]
    fn tampered_node_type_is_reported() {
        use crate::frame::VarType;
        let (mut graph, frame_set) = build(TWO_FRAME, 3);
        // flip an observed variable's type away from its template
        let idx = graph.nodes.iter().position(|n| n.var == "tn").unwrap();
        graph.nodes[idx].ty = VarType::Discrete { cardinality: 9 };
        let diags = validate(&graph, &frame_set);
        assert!(diags
            .iter()
            .any(|d| d.code == Some(codes::E0501)
                && d.message.contains("does not match its template type")));
    }

    #[test]
    fn tampered_node_list_is_reported() {
        let (mut graph, frame_set) = build(TWO_FRAME, 3);
        graph.nodes.pop();
        let diags = validate(&graph, &frame_set);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("requires") || d.message.contains("missing node")));
    }

    #[test]
    fn reversed_edge_is_reported() {
        let (mut graph, frame_set) = build(TWO_FRAME, 3);
        let edge = graph
            .edges
            .iter()
            .position(|e| {
                graph.node_ref(e.parent).position < graph.node_ref(e.child).position
            })
            .unwrap();
        let (p, c) = (graph.edges[edge].parent, graph.edges[edge].child);
        graph.edges[edge].parent = c;
        graph.edges[edge].child = p;
        let diags = validate(&graph, &frame_set);
        assert!(diags.iter().any(|d| d.message.contains("backwards in time")));
    }
}
