// AST node types for .str structure-template files.
//
// Mirrors the surface grammar: a model header, frame blocks keyed by integer
// index, variable blocks with a type clause and an optional conditional-parents
// clause, and a trailing chunk directive. Every node carries a `SimpleSpan`
// for error reporting in downstream phases.
//
// Preconditions: produced by the parser from a valid or partially-valid token stream.
// Postconditions: each node's span covers the source range of the construct.
// Failure modes: none (data-only module).
// Side effects: none.

use chumsky::span::SimpleSpan;

/// Byte-offset span (alias for chumsky's `SimpleSpan`).
pub type Span = SimpleSpan;

// ── Root ──

/// A complete structure-template file: header, frame blocks, chunk directive.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureFile {
    pub model_name: Ident,
    pub frames: Vec<FrameBlock>,
    pub chunk: Option<ChunkDirective>,
    pub span: Span,
}

// ── frame_block: 'frame' ':' INT '{' variable_block+ '}' ──

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBlock {
    pub index: u32,
    pub index_span: Span,
    pub variables: Vec<VariableBlock>,
    pub span: Span,
}

// ── variable_block: 'variable' ':' IDENT '{' type_clause parents_clause? '}' ──

#[derive(Debug, Clone, PartialEq)]
pub struct VariableBlock {
    pub name: Ident,
    pub ty: TypeClause,
    pub parents: Option<ParentsClause>,
    pub span: Span,
}

// ── type_clause ──

/// `type: discrete hidden cardinality N;` or `type: continuous observed a:b;`
#[derive(Debug, Clone, PartialEq)]
pub enum TypeClause {
    Discrete {
        cardinality: u32,
        card_span: Span,
        span: Span,
    },
    /// Observed variable fed by an inclusive range of observation tracks.
    Continuous {
        track_start: u32,
        track_end: u32,
        span: Span,
    },
}

impl TypeClause {
    pub fn span(&self) -> Span {
        match self {
            TypeClause::Discrete { span, .. } => *span,
            TypeClause::Continuous { span, .. } => *span,
        }
    }
}

// ── parents_clause: 'conditionalparents' ':' parent_list 'using' table_ref ';' ──

#[derive(Debug, Clone, PartialEq)]
pub struct ParentsClause {
    /// Time-offset parent references, in declaration order. Empty for `nil`.
    pub parents: Vec<TimeOffsetRef>,
    pub table: TableRef,
    pub span: Span,
}

/// `name(offset)` — a parent reference at a signed frame offset
/// (0 = same frame, negative = earlier frame).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOffsetRef {
    pub name: Ident,
    pub offset: i32,
    pub span: Span,
}

// ── table_ref ──

/// Reference to a named parameter table governing an edge set.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// `DenseCPT("name")` — dense conditional probability table.
    Dense { name: String, name_span: Span, span: Span },
    /// `mixture collection("name") mapping("name")?` — mixture collection,
    /// optionally with an observation index-mapping directive.
    Mixture {
        collection: String,
        collection_span: Span,
        mapping: Option<String>,
        span: Span,
    },
}

impl TableRef {
    pub fn span(&self) -> Span {
        match self {
            TableRef::Dense { span, .. } => *span,
            TableRef::Mixture { span, .. } => *span,
        }
    }

    /// The parameter-table name cited by this reference.
    pub fn table_name(&self) -> &str {
        match self {
            TableRef::Dense { name, .. } => name,
            TableRef::Mixture { collection, .. } => collection,
        }
    }
}

// ── chunk directive: 'chunk' INT ':' INT ──

/// Inclusive default sequence span; length L = end − start + 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDirective {
    pub start: u32,
    pub end: u32,
    pub span: Span,
}

// ── Identifier ──

/// An identifier with its source text and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}
