// bind.rs — Parameter binding arena and tying resolution
//
// Every conditional-parents clause cites a named parameter table. All clauses
// citing the same name share one arena entry, so unrolled edges produced from
// different frames (and different positions) point at the same binding. This
// is the tying relation: the number of bindings is bounded by the number of
// distinct table names, never by sequence length.
//
// Preconditions: `frame_set` passed the frame pass.
// Postconditions: on success, every variable with a parents clause has a
//                 binding, and bindings are allocated in first-citation order.
// Failure modes: incompatible uses of one table name produce E0301.
// Side effects: none.

use std::collections::HashMap;

use serde::Serialize;

use crate::diag::{codes, DiagLevel, Diagnostic};
use crate::frame::{FrameSet, TableKind, VarType};
use crate::id::{BindingId, IdAllocator};

/// One shared parameter binding. All edges citing the same table name refer
/// to the same binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBinding {
    pub table: String,
    pub kind: TableKind,
    /// Cardinality of the child variable this table distributes over.
    /// `None` for continuous children (mixture collections).
    pub child_cardinality: Option<u32>,
    /// Observation index-mapping directive, when the citing clauses carry one.
    pub mapping: Option<String>,
}

/// Arena of shared bindings, indexed by `BindingId` in citation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BindingArena {
    bindings: Vec<ParameterBinding>,
    #[serde(skip)]
    by_name: HashMap<String, BindingId>,
}

impl BindingArena {
    pub fn get(&self, id: BindingId) -> &ParameterBinding {
        &self.bindings[id.0 as usize]
    }

    pub fn lookup(&self, table: &str) -> Option<BindingId> {
        self.by_name.get(table).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BindingId, &ParameterBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (BindingId(i as u32), b))
    }
}

/// Frame templates with parameter bindings resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTemplates {
    pub arena: BindingArena,
    /// Binding for each (frame index, variable name) carrying a parents clause.
    by_var: HashMap<(u32, String), BindingId>,
}

impl BoundTemplates {
    /// The binding governing a variable's incoming edges in a given frame.
    pub fn binding_for(&self, frame_index: u32, var: &str) -> Option<BindingId> {
        self.by_var.get(&(frame_index, var.to_string())).copied()
    }
}

/// Result of the binding pass.
#[derive(Debug)]
pub struct BindResult {
    pub bound: Option<BoundTemplates>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve parameter bindings for every conditional-parents clause.
///
/// Bindings are interned by table name in first-citation order, walking
/// frames by index and variables in declaration order, so allocation is
/// deterministic for a given template set.
pub fn bind_parameters(frame_set: &FrameSet) -> BindResult {
    let mut alloc = IdAllocator::new();
    let mut arena = BindingArena::default();
    let mut by_var: HashMap<(u32, String), BindingId> = HashMap::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for frame in &frame_set.frames {
        for var in &frame.variables {
            let param = match &var.param {
                Some(p) => p,
                None => continue,
            };
            let child_cardinality = match var.ty {
                VarType::Discrete { cardinality } => Some(cardinality),
                VarType::Continuous { .. } => None,
            };

            let id = match arena.by_name.get(&param.table) {
                Some(&existing) => {
                    let binding = &arena.bindings[existing.0 as usize];
                    if binding.kind != param.kind {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagLevel::Error,
                                param.span,
                                format!(
                                    "parameter table '{}' cited as {} but previously cited as {}",
                                    param.table, param.kind, binding.kind
                                ),
                            )
                            .with_code(codes::E0301),
                        );
                        continue;
                    }
                    if binding.child_cardinality != child_cardinality {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagLevel::Error,
                                param.span,
                                format!(
                                    "parameter table '{}' shared by variables of different cardinality ({} vs {})",
                                    param.table,
                                    fmt_card(child_cardinality),
                                    fmt_card(binding.child_cardinality)
                                ),
                            )
                            .with_code(codes::E0301),
                        );
                        continue;
                    }
                    if binding.mapping != param.mapping {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagLevel::Error,
                                param.span,
                                format!(
                                    "parameter table '{}' cited with conflicting mapping directives",
                                    param.table
                                ),
                            )
                            .with_code(codes::E0301),
                        );
                        continue;
                    }
                    existing
                }
                None => {
                    let id = alloc.alloc_binding();
                    arena.bindings.push(ParameterBinding {
                        table: param.table.clone(),
                        kind: param.kind,
                        child_cardinality,
                        mapping: param.mapping.clone(),
                    });
                    arena.by_name.insert(param.table.clone(), id);
                    id
                }
            };
            by_var.insert((frame.index, var.name.clone()), id);
        }
    }

    let bound = if diagnostics.is_empty() {
        Some(BoundTemplates { arena, by_var })
    } else {
        None
    };
    BindResult { bound, diagnostics }
}

fn fmt_card(card: Option<u32>) -> String {
    match card {
        Some(n) => n.to_string(),
        None => "continuous".to_string(),
    }
}

// ── Tests ──
