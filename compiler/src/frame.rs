// frame.rs — Frame template construction from the parsed AST
//
// Converts frame blocks into immutable `FrameTemplate`s and checks every
// template-level invariant: contiguous frame indices, a uniform variable set
// with consistent types across frames, resolvable parent names, no negative
// offsets in the boundary frame, and acyclic intra-frame (offset 0)
// dependencies. Cross-frame offsets stay unresolved here — they depend on
// absolute position and are resolved during unrolling.
//
// Preconditions: `file` is a well-formed AST from the parser.
// Postconditions: returns templates plus all accumulated diagnostics.
// Failure modes: invariant violations produce `Diagnostic` entries; the pass
//                continues past errors where it safely can.
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::ast::{self, Span, StructureFile, TableRef, TypeClause};
use crate::diag::{codes, DiagLevel, Diagnostic};

// ── Public types ────────────────────────────────────────────────────────────

/// The two supported parameter-table kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    DenseConditional,
    MixtureCollection,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::DenseConditional => write!(f, "dense conditional table"),
            TableKind::MixtureCollection => write!(f, "mixture collection"),
        }
    }
}

/// Declared type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarType {
    Discrete {
        cardinality: u32,
    },
    /// Observed variable fed by an inclusive observation-track range.
    Continuous {
        track_start: u32,
        track_end: u32,
    },
}

impl VarType {
    pub fn is_observed(&self) -> bool {
        matches!(self, VarType::Continuous { .. })
    }
}

/// An unresolved parent reference: variable name at a signed frame offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    pub name: String,
    pub offset: i32,
    pub span: Span,
}

/// Reference to the parameter table governing a variable's incoming edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRef {
    pub table: String,
    pub kind: TableKind,
    /// Observation index-mapping directive (mixture collections only).
    pub mapping: Option<String>,
    pub span: Span,
}

/// One variable of a frame template. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTemplate {
    pub name: String,
    pub name_span: Span,
    pub ty: VarType,
    /// Pending parent edges, in declaration order. Empty without a
    /// conditional-parents clause or with `nil` parents.
    pub parents: Vec<ParentRef>,
    /// Present exactly when a conditional-parents clause is present.
    pub param: Option<ParamRef>,
}

/// The declared structure for one representative frame position.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTemplate {
    pub index: u32,
    /// Variables in declaration order (deterministic output depends on it).
    pub variables: Vec<VariableTemplate>,
    pub span: Span,
}

impl FrameTemplate {
    pub fn variable(&self, name: &str) -> Option<&VariableTemplate> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Inclusive default sequence span from the chunk directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkSpec {
    pub start: u32,
    pub end: u32,
}

impl ChunkSpec {
    /// Total sequence length L = end − start + 1.
    /// Construction guarantees start <= end and a length within u32.
    pub fn len(&self) -> u32 {
        (self.end as u64 - self.start as u64 + 1) as u32
    }

    pub fn is_empty(&self) -> bool {
        false // start <= end is checked at construction
    }
}

/// The complete parsed template set: read-only configuration for any number
/// of concurrent unrollings.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    pub model_name: String,
    /// Templates indexed by frame index (contiguous from 0).
    pub frames: Vec<FrameTemplate>,
    pub default_chunk: Option<ChunkSpec>,
}

impl FrameSet {
    /// The boundary template (frame index 0), governing position 0.
    pub fn boundary(&self) -> &FrameTemplate {
        &self.frames[0]
    }

    /// The steady-state template (highest declared index), repeated for
    /// every position at or past its index.
    pub fn steady(&self) -> &FrameTemplate {
        &self.frames[self.frames.len() - 1]
    }

    /// The template governing an absolute position: position 0 uses the
    /// boundary template, intermediate indices govern one position each,
    /// and the steady-state template covers everything beyond.
    pub fn template_for(&self, position: u32) -> &FrameTemplate {
        let idx = (position as usize).min(self.frames.len() - 1);
        &self.frames[idx]
    }

    /// Per-frame variable count (uniform across templates by invariant).
    pub fn var_count(&self) -> usize {
        self.frames[0].variables.len()
    }

    /// Default sequence length from the chunk directive, if declared.
    pub fn default_length(&self) -> Option<u32> {
        self.default_chunk.map(|c| c.len())
    }
}

/// Result of the frame pass.
#[derive(Debug)]
pub struct FrameResult {
    /// Present when the pass got far enough to build a template set; absent
    /// diagnostics imply presence.
    pub frame_set: Option<FrameSet>,
    pub diagnostics: Vec<Diagnostic>,
}

// ── Public entry point ──────────────────────────────────────────────────────

/// Build the frame template set from a parsed structure file.
pub fn build_frames(file: &StructureFile) -> FrameResult {
    let mut ctx = FrameCtx::new();

    let frames = ctx.collect_frames(file);
    if let Some(frames) = &frames {
        ctx.check_variable_consistency(frames);
        ctx.check_parent_references(frames);
        ctx.check_boundary_offsets(&frames[0]);
        for frame in frames {
            ctx.check_intra_frame_cycles(frame);
        }
    }

    let default_chunk = ctx.check_chunk(file);

    let frame_set = match frames {
        Some(frames) if !ctx.has_errors() => Some(FrameSet {
            model_name: file.model_name.name.clone(),
            frames,
            default_chunk,
        }),
        _ => None,
    };

    FrameResult {
        frame_set,
        diagnostics: ctx.diagnostics,
    }
}

// ── Internal context ────────────────────────────────────────────────────────

struct FrameCtx {
    diagnostics: Vec<Diagnostic>,
}

impl FrameCtx {
    fn new() -> Self {
        FrameCtx {
            diagnostics: Vec::new(),
        }
    }

    fn error(&mut self, code: crate::diag::DiagCode, span: Span, message: String) {
        self.diagnostics
            .push(Diagnostic::new(DiagLevel::Error, span, message).with_code(code));
    }

    fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == DiagLevel::Error)
    }

    // ── Frame collection ────────────────────────────────────────────────

    /// Collect frame blocks into templates ordered by index.
    /// Indices must be unique and contiguous from 0.
    fn collect_frames(&mut self, file: &StructureFile) -> Option<Vec<FrameTemplate>> {
        let mut by_index: HashMap<u32, Span> = HashMap::new();
        for block in &file.frames {
            if let Some(first) = by_index.get(&block.index) {
                self.error(
                    codes::E0101,
                    block.index_span,
                    format!(
                        "frame index {} declared more than once (first at offset {})",
                        block.index, first.start
                    ),
                );
            } else {
                by_index.insert(block.index, block.index_span);
            }
        }

        let count = file.frames.len() as u32;
        for expected in 0..count {
            if !by_index.contains_key(&expected) {
                self.error(
                    codes::E0101,
                    file.span,
                    format!(
                        "frame indices must be contiguous from 0: frame {} is missing",
                        expected
                    ),
                );
            }
        }
        if self.has_errors() {
            return None;
        }

        let mut ordered: Vec<&ast::FrameBlock> = file.frames.iter().collect();
        ordered.sort_by_key(|b| b.index);

        Some(
            ordered
                .into_iter()
                .map(|block| FrameTemplate {
                    index: block.index,
                    variables: block.variables.iter().map(build_variable).collect(),
                    span: block.span,
                })
                .collect(),
        )
    }

    // ── Cross-frame consistency ─────────────────────────────────────────

    /// Every frame must declare the same variable set, and a variable must
    /// have the same type everywhere it is declared.
    fn check_variable_consistency(&mut self, frames: &[FrameTemplate]) {
        let reference = &frames[0];
        let mut types: HashMap<&str, (VarType, Span)> = HashMap::new();
        for var in &reference.variables {
            types.insert(var.name.as_str(), (var.ty, var.name_span));
        }

        for frame in &frames[1..] {
            for var in &frame.variables {
                match types.get(var.name.as_str()) {
                    Some((ty, first_span)) => {
                        if *ty != var.ty {
                            self.diagnostics.push(
                                Diagnostic::new(
                                    DiagLevel::Error,
                                    var.name_span,
                                    format!(
                                        "variable '{}' declared with a different type in frame {}",
                                        var.name, frame.index
                                    ),
                                )
                                .with_code(codes::E0102)
                                .with_related(*first_span, "first declaration here"),
                            );
                        }
                    }
                    None => {
                        self.error(
                            codes::E0102,
                            var.name_span,
                            format!(
                                "variable '{}' declared in frame {} but not in frame 0",
                                var.name, frame.index
                            ),
                        );
                    }
                }
            }
            if frame.variables.len() != reference.variables.len() {
                self.error(
                    codes::E0102,
                    frame.span,
                    format!(
                        "frame {} declares {} variables but frame 0 declares {}",
                        frame.index,
                        frame.variables.len(),
                        reference.variables.len()
                    ),
                );
            }
        }
    }

    /// Every parent reference must name a declared variable.
    fn check_parent_references(&mut self, frames: &[FrameTemplate]) {
        let known: Vec<&str> = frames[0].variables.iter().map(|v| v.name.as_str()).collect();
        for frame in frames {
            for var in &frame.variables {
                for parent in &var.parents {
                    if !known.contains(&parent.name.as_str()) {
                        self.error(
                            codes::E0103,
                            parent.span,
                            format!(
                                "parent reference '{}({})' of variable '{}' in frame {} names an undeclared variable",
                                parent.name, parent.offset, var.name, frame.index
                            ),
                        );
                    }
                }
            }
        }
    }

    /// The boundary template must not reach before the sequence start.
    fn check_boundary_offsets(&mut self, boundary: &FrameTemplate) {
        for var in &boundary.variables {
            for parent in &var.parents {
                if parent.offset < 0 {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagLevel::Error,
                            parent.span,
                            format!(
                                "boundary frame declares negative-offset parent '{}({})' for variable '{}'",
                                parent.name, parent.offset, var.name
                            ),
                        )
                        .with_code(codes::E0104)
                        .with_hint("no earlier frame exists at the first position"),
                    );
                }
            }
        }
    }

    // ── Intra-frame cycle detection ─────────────────────────────────────

    /// Offset-0 dependencies within one frame must be acyclic. DFS with
    /// three-colour marking; on a back edge the cycle path is reported.
    fn check_intra_frame_cycles(&mut self, frame: &FrameTemplate) {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Grey,
            Black,
        }

        let n = frame.variables.len();
        let index_of: HashMap<&str, usize> = frame
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.as_str(), i))
            .collect();

        // adjacency: child -> same-frame parents
        let adj: Vec<Vec<usize>> = frame
            .variables
            .iter()
            .map(|v| {
                v.parents
                    .iter()
                    .filter(|p| p.offset == 0)
                    .filter_map(|p| index_of.get(p.name.as_str()).copied())
                    .collect()
            })
            .collect();

        let mut marks = vec![Mark::White; n];
        let mut stack: Vec<usize> = Vec::new();

        fn visit(
            node: usize,
            adj: &[Vec<usize>],
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            marks[node] = Mark::Grey;
            stack.push(node);
            for &next in &adj[node] {
                match marks[next] {
                    Mark::Grey => {
                        // back edge: slice the stack from the repeated node
                        let start = stack.iter().position(|&s| s == next).unwrap_or(0);
                        let mut cycle = stack[start..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Mark::White => {
                        if let Some(cycle) = visit(next, adj, marks, stack) {
                            return Some(cycle);
                        }
                    }
                    Mark::Black => {}
                }
            }
            stack.pop();
            marks[node] = Mark::Black;
            None
        }

        for start in 0..n {
            if marks[start] == Mark::White {
                if let Some(cycle) = visit(start, &adj, &mut marks, &mut stack) {
                    let names: Vec<&str> = cycle
                        .iter()
                        .map(|&i| frame.variables[i].name.as_str())
                        .collect();
                    self.error(
                        codes::E0201,
                        frame.variables[cycle[0]].name_span,
                        format!(
                            "cyclic same-frame dependency in frame {}: {}",
                            frame.index,
                            names.join(" -> ")
                        ),
                    );
                    return; // one cycle per frame is enough to act on
                }
            }
        }
    }

    // ── Chunk directive ─────────────────────────────────────────────────

    fn check_chunk(&mut self, file: &StructureFile) -> Option<ChunkSpec> {
        let chunk = file.chunk.as_ref()?;
        if chunk.end < chunk.start {
            self.error(
                codes::E0105,
                chunk.span,
                format!(
                    "chunk directive {}:{} is empty (end precedes start)",
                    chunk.start, chunk.end
                ),
            );
            return None;
        }
        let span_len = chunk.end as u64 - chunk.start as u64 + 1;
        if span_len > u32::MAX as u64 {
            self.error(
                codes::E0105,
                chunk.span,
                format!(
                    "chunk directive {}:{} spans {} positions, which exceeds the supported maximum of {}",
                    chunk.start, chunk.end, span_len, u32::MAX
                ),
            );
            return None;
        }
        Some(ChunkSpec {
            start: chunk.start,
            end: chunk.end,
        })
    }
}

// ── AST lowering helpers ────────────────────────────────────────────────────

fn build_variable(block: &ast::VariableBlock) -> VariableTemplate {
    let ty = match &block.ty {
        TypeClause::Discrete { cardinality, .. } => VarType::Discrete {
            cardinality: *cardinality,
        },
        TypeClause::Continuous {
            track_start,
            track_end,
            ..
        } => VarType::Continuous {
            track_start: *track_start,
            track_end: *track_end,
        },
    };

    let (parents, param) = match &block.parents {
        Some(clause) => {
            let parents = clause
                .parents
                .iter()
                .map(|p| ParentRef {
                    name: p.name.name.clone(),
                    offset: p.offset,
                    span: p.span,
                })
                .collect();
            let param = match &clause.table {
                TableRef::Dense { name, .. } => ParamRef {
                    table: name.clone(),
                    kind: TableKind::DenseConditional,
                    mapping: None,
                    span: clause.table.span(),
                },
                TableRef::Mixture {
                    collection,
                    mapping,
                    ..
                } => ParamRef {
                    table: collection.clone(),
                    kind: TableKind::MixtureCollection,
                    mapping: mapping.clone(),
                    span: clause.table.span(),
                },
            };
            (parents, Some(param))
        }
        None => (Vec::new(), None),
    };

    VariableTemplate {
        name: block.name.name.clone(),
        name_span: block.name.span,
        ty,
        parents,
        param,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn frames_ok(source: &str) -> FrameSet {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let result = build_frames(&parsed.file.unwrap());
        assert!(
            result.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            result.diagnostics
        );
        result.frame_set.expect("expected frame set")
    }

    fn frames_err(source: &str) -> Vec<Diagnostic> {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let result = build_frames(&parsed.file.unwrap());
        assert!(result.frame_set.is_none(), "expected failure");
        assert!(!result.diagnostics.is_empty());
        result.diagnostics
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
    conditionalparents: seg(0) using mixture collection("col_tn") mapping("map_tn");
  }
}
frame: 1 {
  variable: seg {
    type: discrete hidden cardinality 4;
    conditionalparents: seg(-1) using DenseCPT("seg_seg");
  }
  variable: tn {
    type: continuous observed 0:0;
    conditionalparents: seg(-1) using mixture collection("col_tn") mapping("map_tn");
  }
}
chunk 1:1
"#;

    // ── Happy path ──

    #[test]
    fn builds_two_frame_set() {
        let fs = frames_ok(TWO_FRAME);
        assert_eq!(fs.model_name, "m");
        assert_eq!(fs.frames.len(), 2);
        assert_eq!(fs.var_count(), 2);
        assert_eq!(fs.default_length(), Some(1));
        assert_eq!(fs.boundary().index, 0);
        assert_eq!(fs.steady().index, 1);
    }

    #[test]
    fn template_selection_by_position() {
        let fs = frames_ok(TWO_FRAME);
        assert_eq!(fs.template_for(0).index, 0);
        assert_eq!(fs.template_for(1).index, 1);
        assert_eq!(fs.template_for(7).index, 1);
    }

    #[test]
    fn variable_order_preserved() {
        let fs = frames_ok(TWO_FRAME);
        let names: Vec<&str> = fs
            .boundary()
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["seg", "tn"]);
    }

    #[test]
    fn parent_refs_lowered() {
        let fs = frames_ok(TWO_FRAME);
        let seg1 = fs.steady().variable("seg").unwrap();
        assert_eq!(seg1.parents.len(), 1);
        assert_eq!(seg1.parents[0].name, "seg");
        assert_eq!(seg1.parents[0].offset, -1);
        let param = seg1.param.as_ref().unwrap();
        assert_eq!(param.table, "seg_seg");
        assert_eq!(param.kind, TableKind::DenseConditional);
    }

    #[test]
    fn mapping_directive_lowered() {
        let fs = frames_ok(TWO_FRAME);
        let tn = fs.boundary().variable("tn").unwrap();
        let param = tn.param.as_ref().unwrap();
        assert_eq!(param.kind, TableKind::MixtureCollection);
        assert_eq!(param.mapping.as_deref(), Some("map_tn"));
    }

    #[test]
    fn chunk_len() {
        assert_eq!(ChunkSpec { start: 1, end: 1 }.len(), 1);
        assert_eq!(ChunkSpec { start: 0, end: 99 }.len(), 100);
    }

    // ── Frame index errors ──

    #[test]
    fn duplicate_frame_index() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0101));
    }

    #[test]
    fn non_contiguous_frame_indices() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
frame: 2 { variable: a { type: discrete hidden cardinality 2; } }
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0101));
        assert!(diags[0].message.contains("frame 1 is missing"));
    }

    // ── Cross-frame consistency errors ──

    #[test]
    fn type_conflict_across_frames() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
frame: 1 { variable: a { type: discrete hidden cardinality 3; } }
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0102));
        assert_eq!(diags[0].related_spans.len(), 1);
    }

    #[test]
    fn variable_set_mismatch() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
frame: 1 { variable: b { type: discrete hidden cardinality 2; } }
"#,
        );
        assert!(diags.iter().any(|d| d.code == Some(codes::E0102)));
    }

    // ── Parent reference errors ──

    #[test]
    fn unknown_parent_variable() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: a {
    type: discrete hidden cardinality 2;
    conditionalparents: ghost(0) using DenseCPT("t");
  }
}
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0103));
        assert!(diags[0].message.contains("ghost"));
    }

    #[test]
    fn negative_offset_in_boundary_frame() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: a {
    type: discrete hidden cardinality 2;
    conditionalparents: a(-1) using DenseCPT("t");
  }
}
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0104));
    }

    // ── Cycle detection ──

    #[test]
    fn intra_frame_cycle_detected() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: a {
    type: discrete hidden cardinality 2;
    conditionalparents: b(0) using DenseCPT("ta");
  }
  variable: b {
    type: discrete hidden cardinality 2;
    conditionalparents: a(0) using DenseCPT("tb");
  }
}
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0201));
        assert!(
            diags[0].message.contains("a -> b") || diags[0].message.contains("b -> a"),
            "cycle not named: {}",
            diags[0].message
        );
    }

    #[test]
    fn self_loop_at_offset_zero_detected() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: a {
    type: discrete hidden cardinality 2;
    conditionalparents: a(0) using DenseCPT("t");
  }
}
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0201));
    }

    #[test]
    fn forward_intra_frame_reference_is_acyclic() {
        // `a` depends on `b` declared later in the same frame: fine.
        frames_ok(
            r#"
GRAPHICAL_MODEL m
frame: 0 {
  variable: a {
    type: discrete hidden cardinality 2;
    conditionalparents: b(0) using DenseCPT("t");
  }
  variable: b { type: discrete hidden cardinality 2; }
}
"#,
        );
    }

    #[test]
    fn negative_self_reference_is_not_a_cycle() {
        // seg(-1) crosses positions; only offset-0 edges can cycle.
        frames_ok(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: seg { type: discrete hidden cardinality 2; } }
frame: 1 {
  variable: seg {
    type: discrete hidden cardinality 2;
    conditionalparents: seg(-1) using DenseCPT("t");
  }
}
"#,
        );
    }

    // ── Chunk errors ──

    #[test]
    fn inverted_chunk_rejected() {
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
chunk 5:2
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0105));
    }

    #[test]
    fn full_range_chunk_rejected() {
        // 0:4294967295 spans 2^32 positions; the length itself would not
        // fit in u32, so the directive is rejected rather than wrapping
        let diags = frames_err(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
chunk 0:4294967295
"#,
        );
        assert_eq!(diags[0].code, Some(codes::E0105));
        assert!(diags[0].message.contains("exceeds the supported maximum"));
    }

    #[test]
    fn widest_valid_chunk_length() {
        let fs = frames_ok(
            r#"
GRAPHICAL_MODEL m
frame: 0 { variable: a { type: discrete hidden cardinality 2; } }
chunk 1:4294967295
"#,
        );
        assert_eq!(fs.default_length(), Some(u32::MAX));
    }

    // ── Determinism ──

    #[test]
    fn rebuild_is_structurally_identical() {
        let a = frames_ok(TWO_FRAME);
        let b = frames_ok(TWO_FRAME);
        assert_eq!(a, b);
    }
}
