// diag.rs — Unified diagnostics model
//
// Provides the shared diagnostic types used across all compiler phases, plus
// the stable error-kind classification surfaced to callers of the pipeline.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use crate::ast::Span;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0001`).
///
/// Codes are `&'static str` constants defined in the `codes` module.
/// Once assigned, a code must never be reassigned to a different semantic
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable diagnostic codes, grouped by phase.
pub mod codes {
    use super::DiagCode;

    // Parse stage
    pub const E0001: DiagCode = DiagCode("E0001"); // syntax error (lex/parse)
    pub const E0002: DiagCode = DiagCode("E0002"); // variable block missing type clause
    pub const E0003: DiagCode = DiagCode("E0003"); // unknown parameter-table kind
    pub const E0004: DiagCode = DiagCode("E0004"); // duplicate variable within a frame

    // Frame pass
    pub const E0101: DiagCode = DiagCode("E0101"); // frame index duplicate/missing/non-contiguous
    pub const E0102: DiagCode = DiagCode("E0102"); // variable type conflict across frames
    pub const E0103: DiagCode = DiagCode("E0103"); // parent reference to unknown variable
    pub const E0104: DiagCode = DiagCode("E0104"); // negative offset in boundary frame
    pub const E0105: DiagCode = DiagCode("E0105"); // invalid chunk directive

    // Cycle detection
    pub const E0201: DiagCode = DiagCode("E0201"); // intra-frame dependency cycle

    // Parameter binding
    pub const E0301: DiagCode = DiagCode("E0301"); // parameter table kind/shape mismatch

    // Unrolling
    pub const E0401: DiagCode = DiagCode("E0401"); // time-offset reference out of range
    pub const E0402: DiagCode = DiagCode("E0402"); // requested chunk length < 1

    // Validation
    pub const E0501: DiagCode = DiagCode("E0501"); // post-unroll structural defect
    pub const E0502: DiagCode = DiagCode("E0502"); // no chunk directive and no explicit length
}

// ── Error kind ───────────────────────────────────────────────────────────

/// Coarse classification of a failed compilation, derived from the stable
/// diagnostic codes. This is the error taxonomy callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed template text (lex or parse stage).
    Parse,
    /// Dependency cycle among variables declared in the same frame.
    CyclicDependency,
    /// The same parameter-table name used with incompatible kinds.
    ParameterKindMismatch,
    /// A time-offset reference resolved outside the unrolled sequence.
    OffsetOutOfRange,
    /// Post-unroll structural defect, or a template-structure invariant
    /// violation caught before unrolling.
    Validation,
}

impl ErrorKind {
    /// Classify a diagnostic code into an error kind.
    pub fn from_code(code: DiagCode) -> ErrorKind {
        match code.0 {
            "E0001" | "E0002" | "E0003" | "E0004" => ErrorKind::Parse,
            "E0201" => ErrorKind::CyclicDependency,
            "E0301" => ErrorKind::ParameterKindMismatch,
            "E0401" | "E0402" => ErrorKind::OffsetOutOfRange,
            _ => ErrorKind::Validation,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::CyclicDependency => "cyclic dependency",
            ErrorKind::ParameterKindMismatch => "parameter kind mismatch",
            ErrorKind::OffsetOutOfRange => "offset out of range",
            ErrorKind::Validation => "validation error",
        };
        write!(f, "{name}")
    }
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Related span ─────────────────────────────────────────────────────────

/// A secondary source location providing context for a diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedSpan {
    pub span: Span,
    pub label: String,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A compiler diagnostic emitted by any phase.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
    pub related_spans: Vec<RelatedSpan>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code, hint, or related spans.
    pub fn new(level: DiagLevel, span: Span, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            span,
            message: message.into(),
            hint: None,
            related_spans: Vec::new(),
        }
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a related span.
    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.related_spans.push(RelatedSpan {
            span,
            label: label.into(),
        });
        self
    }

    /// Render with source context: `error[E0001]: 3:7: message`.
    ///
    /// Line and column are 1-based, derived from the diagnostic's byte span.
    pub fn render(&self, source: &str) -> String {
        let (line, col) = line_col(source, self.span.start);
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        let mut out = match &self.code {
            Some(code) => format!("{}[{}]: {}:{}: {}", level, code, line, col, self.message),
            None => format!("{}: {}:{}: {}", level, line, col, self.message),
        };
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  hint: {}", hint));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

/// Compute the 1-based (line, column) of a byte offset in `source`.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        use chumsky::span::Span as _;
        Span::new((), 0..1)
    }

    #[test]
    fn display_without_code() {
        let d = Diagnostic::new(DiagLevel::Error, dummy_span(), "something failed");
        assert_eq!(format!("{d}"), "error: something failed");
    }

    #[test]
    fn display_with_code() {
        let d = Diagnostic::new(DiagLevel::Warning, dummy_span(), "unused table")
            .with_code(codes::E0301);
        assert_eq!(format!("{d}"), "warning[E0301]: unused table");
    }

    #[test]
    fn builder_chain() {
        let d = Diagnostic::new(DiagLevel::Error, dummy_span(), "kind mismatch")
            .with_code(codes::E0301)
            .with_hint("use one kind per table name")
            .with_related(dummy_span(), "first reference here");

        assert_eq!(d.code, Some(codes::E0301));
        assert_eq!(d.hint.as_deref(), Some("use one kind per table name"));
        assert_eq!(d.related_spans.len(), 1);
    }

    #[test]
    fn line_col_basics() {
        let src = "frame: 0 {\n  variable: seg {\n}";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 7), (1, 8));
        assert_eq!(line_col(src, 11), (2, 1));
        assert_eq!(line_col(src, 13), (2, 3));
    }

    #[test]
    fn line_col_offset_past_end_clamps() {
        assert_eq!(line_col("ab", 100), (1, 3));
    }

    #[test]
    fn render_includes_position() {
        let src = "frame: 0 {\nbad";
        use chumsky::span::Span as _;
        let d = Diagnostic::new(DiagLevel::Error, Span::new((), 11..14), "bad token")
            .with_code(codes::E0001);
        assert_eq!(d.render(src), "error[E0001]: 2:1: bad token");
    }

    #[test]
    fn kind_classification() {
        assert_eq!(ErrorKind::from_code(codes::E0001), ErrorKind::Parse);
        assert_eq!(ErrorKind::from_code(codes::E0004), ErrorKind::Parse);
        assert_eq!(
            ErrorKind::from_code(codes::E0201),
            ErrorKind::CyclicDependency
        );
        assert_eq!(
            ErrorKind::from_code(codes::E0301),
            ErrorKind::ParameterKindMismatch
        );
        assert_eq!(
            ErrorKind::from_code(codes::E0401),
            ErrorKind::OffsetOutOfRange
        );
        assert_eq!(ErrorKind::from_code(codes::E0501), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_code(codes::E0502), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_code(codes::E0102), ErrorKind::Validation);
    }
}
