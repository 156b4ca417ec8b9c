// pipeline.rs — Pass orchestration, error surface, provenance, and caching
//
// Runs the fixed pass sequence parse -> frames -> bind -> unroll -> validate
// and folds each pass's diagnostics into one `CompileError` classified by the
// first error's stable code. The template set and binding arena are read-only
// after construction, so one parse can serve any number of unrollings; the
// `GraphCache` memoizes finished graphs by (source hash, length).
//
// Preconditions: none.
// Postconditions: `compile_source` returns a validated graph or a classified
//                 error carrying every diagnostic the failing pass produced.
// Failure modes: see the per-pass failure modes; nothing here adds its own.
// Side effects: none (verbose reporting lives in the binary).

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::bind::{bind_parameters, BoundTemplates};
use crate::diag::{codes, DiagLevel, Diagnostic, ErrorKind};
use crate::frame::{build_frames, FrameSet};
use crate::unroll::{unroll, UnrolledGraph};
use crate::validate::validate;

// ── Error surface ───────────────────────────────────────────────────────────

/// A failed compilation: the kind of the first error plus every diagnostic
/// the failing pass produced.
#[derive(Debug)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let kind = diagnostics
            .iter()
            .find(|d| d.level == DiagLevel::Error)
            .and_then(|d| d.code)
            .map(ErrorKind::from_code)
            .unwrap_or(ErrorKind::Validation);
        CompileError { kind, diagnostics }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for d in &self.diagnostics {
            write!(f, "\n{d}")?;
        }
        Ok(())
    }
}

impl Error for CompileError {}

// ── Pass orchestration ──────────────────────────────────────────────────────

/// Parsed, checked, and bound templates: the read-only configuration shared
/// by every unrolling of one source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplates {
    pub frame_set: FrameSet,
    pub bound: BoundTemplates,
}

/// Run the front half of the pipeline: parse, frame pass, binding pass.
pub fn parse_templates(source: &str) -> Result<CompiledTemplates, CompileError> {
    let parsed = crate::parser::parse(source);
    if !parsed.errors.is_empty() || parsed.file.is_none() {
        let diagnostics = parsed
            .errors
            .iter()
            .map(|err| {
                Diagnostic::new(DiagLevel::Error, *err.span(), format!("{}", err.reason()))
                    .with_code(codes::E0001)
            })
            .collect();
        return Err(CompileError::from_diagnostics(diagnostics));
    }
    let file = parsed.file.unwrap();

    let frames = build_frames(&file);
    let frame_set = match frames.frame_set {
        Some(fs) => fs,
        None => return Err(CompileError::from_diagnostics(frames.diagnostics)),
    };

    let bind = bind_parameters(&frame_set);
    let bound = match bind.bound {
        Some(b) => b,
        None => return Err(CompileError::from_diagnostics(bind.diagnostics)),
    };

    Ok(CompiledTemplates { frame_set, bound })
}

/// Unroll already-parsed templates to `length` positions and validate.
pub fn compile(
    templates: &CompiledTemplates,
    length: u32,
) -> Result<UnrolledGraph, CompileError> {
    let graph = unroll(&templates.frame_set, &templates.bound, length)
        .map_err(|d| CompileError::from_diagnostics(vec![d]))?;

    let defects = validate(&graph, &templates.frame_set);
    if !defects.is_empty() {
        return Err(CompileError::from_diagnostics(defects));
    }
    Ok(graph)
}

/// Full pipeline from source text. `length_override` takes precedence over
/// the chunk directive; without either the compilation fails.
pub fn compile_source(
    source: &str,
    length_override: Option<u32>,
) -> Result<UnrolledGraph, CompileError> {
    let templates = parse_templates(source)?;
    let length = match length_override.or(templates.frame_set.default_length()) {
        Some(l) => l,
        None => {
            return Err(CompileError::from_diagnostics(vec![Diagnostic::new(
                DiagLevel::Error,
                templates.frame_set.boundary().span,
                "no chunk directive and no explicit length given",
            )
            .with_code(codes::E0502)
            .with_hint("add a `chunk s:e` directive or pass a length")]));
        }
    };
    compile(&templates, length)
}

// ── Provenance ──────────────────────────────────────────────────────────────

/// Provenance metadata for reproducible builds and cache-key use.
///
/// `source_hash`: SHA-256 of the raw `.str` source text.
/// `compiler_version`: crate version from `Cargo.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub source_hash: [u8; 32],
    pub compiler_version: &'static str,
}

impl Provenance {
    /// Hex string of the source hash (64 characters).
    pub fn source_hash_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.source_hash {
            use std::fmt::Write;
            let _ = write!(s, "{:02x}", b);
        }
        s
    }

    /// Serialize provenance as a JSON string for `--emit build-info`.
    pub fn to_json(&self) -> String {
        format!(
            "{{\n  \"source_hash\": \"{}\",\n  \"compiler_version\": \"{}\"\n}}\n",
            self.source_hash_hex(),
            self.compiler_version,
        )
    }
}

/// Compute provenance from source text. Uses SHA-256.
pub fn compute_provenance(source: &str) -> Provenance {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let result = hasher.finalize();
    let mut source_hash = [0u8; 32];
    source_hash.copy_from_slice(&result);

    Provenance {
        source_hash,
        compiler_version: env!("CARGO_PKG_VERSION"),
    }
}

// ── Graph cache ─────────────────────────────────────────────────────────────

/// Memoizes finished graphs keyed by (source hash, length).
///
/// Concurrent callers may race on a cold key; both compile, and the later
/// insert wins. Determinism makes both results identical, so the race is
/// harmless. Callers share the cached graph through `Arc`.
#[derive(Default)]
pub struct GraphCache {
    entries: Mutex<HashMap<([u8; 32], u32), Arc<UnrolledGraph>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached graph for (source, length), compiling on a miss.
    pub fn get_or_compile(
        &self,
        source: &str,
        length_override: Option<u32>,
    ) -> Result<Arc<UnrolledGraph>, CompileError> {
        let provenance = compute_provenance(source);

        // Resolve the effective length up front so the key is exact even
        // when the caller relies on the chunk directive.
        let templates = parse_templates(source)?;
        let length = match length_override.or(templates.frame_set.default_length()) {
            Some(l) => l,
            None => {
                return Err(CompileError::from_diagnostics(vec![Diagnostic::new(
                    DiagLevel::Error,
                    templates.frame_set.boundary().span,
                    "no chunk directive and no explicit length given",
                )
                .with_code(codes::E0502)]));
            }
        };
        let key = (provenance.source_hash, length);

        if let Some(hit) = self.entries.lock().unwrap().get(&key) {
            return Ok(Arc::clone(hit));
        }

        // Compile outside the lock. Failed compilations are never cached.
        let graph = Arc::new(compile(&templates, length)?);
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key).or_insert_with(|| Arc::clone(&graph));
        Ok(Arc::clone(entry))
    }

    /// Number of cached graphs.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ──
