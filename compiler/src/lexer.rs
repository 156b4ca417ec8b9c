// Lexer for .str structure-template files.
//
// Tokenizes the frame-template grammar (model header, frame blocks, variable
// blocks, chunk directive). Uses the `logos` crate for DFA-based lexing.
//
// Preconditions: input is valid UTF-8.
// Postconditions: returns all tokens with byte-offset spans, plus any lex errors.
// Failure modes: unrecognized characters produce `LexError`; lexing continues.
// Side effects: none.

use logos::Logos;
use std::fmt;

/// Byte-offset span in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A lexer error with location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Result of lexing: tokens plus any errors (non-fatal).
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<(Token, Span)>,
    pub errors: Vec<LexError>,
}

/// Structure-template token types.
///
/// Keywords and symbols are matched as fixed strings. Integer and string
/// literals carry parsed values. Identifiers carry no value — use the span
/// to retrieve the text from the source.
///
/// Whitespace is insignificant; `%` starts a line comment (GMTK convention).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+|%[^\n]*")]
pub enum Token {
    // ── Keywords ──
    #[token("GRAPHICAL_MODEL")]
    GraphicalModel,
    #[token("frame")]
    Frame,
    #[token("variable")]
    Variable,
    #[token("type")]
    Type,
    #[token("discrete")]
    Discrete,
    #[token("continuous")]
    Continuous,
    #[token("hidden")]
    Hidden,
    #[token("observed")]
    Observed,
    #[token("cardinality")]
    Cardinality,
    #[token("conditionalparents")]
    ConditionalParents,
    #[token("nil")]
    Nil,
    #[token("using")]
    Using,
    #[token("mixture")]
    Mixture,
    #[token("collection")]
    Collection,
    #[token("mapping")]
    Mapping,
    #[token("chunk")]
    Chunk,
    /// Dense conditional probability table kind.
    #[token("DenseCPT")]
    DenseCpt,

    // ── Symbols ──
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // ── Literals ──
    /// Signed integer literal (frame indices, cardinalities, time offsets).
    #[regex(r"-?[0-9]+", parse_int)]
    Int(i64),

    /// String literal with `\"` and `\\` escapes (parameter-table names).
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    StringLit(String),

    // ── Identifier ──
    //
    // Placed after keywords — logos prioritises fixed `#[token]` matches
    // over regex for the same length, so `frame` matches Frame, not Ident.
    /// Identifier: `[a-zA-Z_][a-zA-Z0-9_]*`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::GraphicalModel => write!(f, "GRAPHICAL_MODEL"),
            Token::Frame => write!(f, "frame"),
            Token::Variable => write!(f, "variable"),
            Token::Type => write!(f, "type"),
            Token::Discrete => write!(f, "discrete"),
            Token::Continuous => write!(f, "continuous"),
            Token::Hidden => write!(f, "hidden"),
            Token::Observed => write!(f, "observed"),
            Token::Cardinality => write!(f, "cardinality"),
            Token::ConditionalParents => write!(f, "conditionalparents"),
            Token::Nil => write!(f, "nil"),
            Token::Using => write!(f, "using"),
            Token::Mixture => write!(f, "mixture"),
            Token::Collection => write!(f, "collection"),
            Token::Mapping => write!(f, "mapping"),
            Token::Chunk => write!(f, "chunk"),
            Token::DenseCpt => write!(f, "DenseCPT"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Int(v) => write!(f, "{v}"),
            Token::StringLit(s) => write!(f, "\"{s}\""),
            Token::Ident => write!(f, "<ident>"),
        }
    }
}

// ── Callbacks ──

fn parse_int(lex: &mut logos::Lexer<'_, Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<'_, Token>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1]; // strip quotes
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                '"' => result.push('"'),
                '\\' => result.push('\\'),
                _ => {
                    // Only \" and \\ are supported. Reject unknown escapes.
                    return None;
                }
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

// ── Public API ──

/// Lex a structure-template source string into tokens.
///
/// Returns all successfully parsed tokens together with any errors for
/// unrecognised characters. Lexing is non-fatal: errors are collected and
/// the lexer continues past bad characters.
pub fn lex(source: &str) -> LexResult {
    let lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, range) in lexer.spanned() {
        let span = Span {
            start: range.start,
            end: range.end,
        };
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => errors.push(LexError {
                span,
                message: format!("unexpected character: {:?}", &source[span.start..span.end]),
            }),
        }
    }

    LexResult { tokens, errors }
}

// ── Tests ──
