// unroll.rs — Chunk unrolling: frame templates to an explicit graph
//
// Instantiates the template set over L absolute positions. Position 0 uses
// the boundary template, intermediate indices govern one position each, and
// the steady-state template repeats for the remainder. All nodes are created
// first in position-major declaration order, then edges in the same order, so
// IDs are dense and assignment is deterministic for identical inputs.
//
// Preconditions: `frame_set` passed the frame pass, `bound` the binding pass.
// Postconditions: on success the graph holds exactly L x V nodes and every
//                 declared edge, each edge citing its shared binding.
// Failure modes: a time-offset reference resolving before the sequence start
//                or past its own position aborts with E0401 and no partial
//                graph; L = 0 aborts with E0402.
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::bind::{BindingArena, BoundTemplates};
use crate::diag::{codes, DiagLevel, Diagnostic};
use crate::frame::{FrameSet, VarType};
use crate::id::{BindingId, EdgeId, IdAllocator, NodeId};

/// One variable instance at an absolute sequence position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnrolledNode {
    pub id: NodeId,
    pub var: String,
    pub position: u32,
    pub ty: VarType,
}

/// A directed dependency edge from parent instance to child instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnrolledEdge {
    pub id: EdgeId,
    pub parent: NodeId,
    pub child: NodeId,
    /// Shared parameter binding governing the child's conditional distribution.
    pub binding: BindingId,
}

/// The fully unrolled inference graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnrolledGraph {
    pub model_name: String,
    pub length: u32,
    pub nodes: Vec<UnrolledNode>,
    pub edges: Vec<UnrolledEdge>,
    pub bindings: BindingArena,
    #[serde(skip)]
    node_index: HashMap<(String, u32), NodeId>,
}

impl UnrolledGraph {
    /// Look up the node for a variable instance at a position.
    pub fn node(&self, var: &str, position: u32) -> Option<NodeId> {
        self.node_index.get(&(var.to_string(), position)).copied()
    }

    pub fn node_ref(&self, id: NodeId) -> &UnrolledNode {
        &self.nodes[id.0 as usize]
    }

    /// Number of edges entering a node.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.child == id).count()
    }

    /// Edges entering a node, in creation order.
    pub fn parents_of(&self, id: NodeId) -> impl Iterator<Item = &UnrolledEdge> {
        self.edges.iter().filter(move |e| e.child == id)
    }
}

impl fmt::Display for UnrolledGraph {
    /// One line per node: `var@pos <- parent@pos, ... [table]`, in node order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} positions, {} nodes, {} edges, {} bindings",
            self.model_name,
            self.length,
            self.nodes.len(),
            self.edges.len(),
            self.bindings.len()
        )?;
        for node in &self.nodes {
            write!(f, "  {}@{}", node.var, node.position)?;
            let incoming: Vec<&UnrolledEdge> = self.parents_of(node.id).collect();
            if let Some(first) = incoming.first() {
                let parents: Vec<String> = incoming
                    .iter()
                    .map(|e| {
                        let p = self.node_ref(e.parent);
                        format!("{}@{}", p.var, p.position)
                    })
                    .collect();
                write!(
                    f,
                    " <- {} [{}]",
                    parents.join(", "),
                    self.bindings.get(first.binding).table
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Unroll the template set over a sequence of `length` positions.
pub fn unroll(
    frame_set: &FrameSet,
    bound: &BoundTemplates,
    length: u32,
) -> Result<UnrolledGraph, Diagnostic> {
    if length == 0 {
        return Err(Diagnostic::new(
            DiagLevel::Error,
            frame_set.boundary().span,
            "cannot unroll to a sequence of length 0",
        )
        .with_code(codes::E0402)
        .with_hint("the chunk must cover at least one position"));
    }

    let mut alloc = IdAllocator::new();
    let mut nodes: Vec<UnrolledNode> = Vec::with_capacity(length as usize * frame_set.var_count());
    let mut node_index: HashMap<(String, u32), NodeId> = HashMap::new();

    // Node pass: every variable instance exists before any edge is created,
    // so same-position forward references resolve.
    for position in 0..length {
        let template = frame_set.template_for(position);
        for var in &template.variables {
            let id = alloc.alloc_node();
            node_index.insert((var.name.clone(), position), id);
            nodes.push(UnrolledNode {
                id,
                var: var.name.clone(),
                position,
                ty: var.ty,
            });
        }
    }

    // Edge pass, in the same position-major order.
    let mut edges: Vec<UnrolledEdge> = Vec::new();
    for position in 0..length {
        let template = frame_set.template_for(position);
        for var in &template.variables {
            let binding = match bound.binding_for(template.index, &var.name) {
                Some(b) => b,
                None => continue,
            };
            let child = node_index[&(var.name.clone(), position)];
            for parent_ref in &var.parents {
                let parent_pos = position as i64 + parent_ref.offset as i64;
                if parent_pos < 0 {
                    return Err(Diagnostic::new(
                        DiagLevel::Error,
                        parent_ref.span,
                        format!(
                            "parent reference '{}({})' of '{}' at position {} resolves before the sequence start",
                            parent_ref.name, parent_ref.offset, var.name, position
                        ),
                    )
                    .with_code(codes::E0401));
                }
                // a parent must live at or before its child's position,
                // otherwise no left-to-right topological order exists
                if parent_pos > position as i64 {
                    return Err(Diagnostic::new(
                        DiagLevel::Error,
                        parent_ref.span,
                        format!(
                            "parent reference '{}({})' of '{}' at position {} resolves past the current position",
                            parent_ref.name, parent_ref.offset, var.name, position
                        ),
                    )
                    .with_code(codes::E0401));
                }
                let parent = node_index[&(parent_ref.name.clone(), parent_pos as u32)];
                edges.push(UnrolledEdge {
                    id: alloc.alloc_edge(),
                    parent,
                    child,
                    binding,
                });
            }
        }
    }

    Ok(UnrolledGraph {
        model_name: frame_set.model_name.clone(),
        length,
        nodes,
        edges,
        bindings: bound.arena.clone(),
        node_index,
    })
}

// ── Tests ──
