// Parser for .str structure-template files.
//
// Parses a token stream (from the lexer) into an AST per the frame-template
// grammar. Uses chumsky combinators.
//
// Preconditions: input is a valid token stream from `lexer::lex()`.
// Postconditions: returns an AST plus any parse errors (non-fatal).
// Failure modes: syntax errors produce `Rich` diagnostics; parsing continues.
// Side effects: none.

use std::collections::HashMap;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::ast::*;
use crate::lexer::Token;

/// Result of parsing: AST plus any errors.
#[derive(Debug)]
pub struct ParseResult {
    pub file: Option<StructureFile>,
    pub errors: Vec<Rich<'static, Token, SimpleSpan>>,
}

/// Parse a structure-template source string. Lexes then parses.
///
/// Returns an AST (if parsing succeeded) plus any errors. Parsing is pure:
/// reparsing identical text always yields a structurally identical AST.
pub fn parse(source: &str) -> ParseResult {
    let lex_result = crate::lexer::lex(source);
    let len = source.len();

    // Convert lexer output to chumsky stream.
    let token_iter = lex_result.tokens.into_iter().map(|(tok, span)| {
        let cspan: SimpleSpan = (span.start..span.end).into();
        (tok, cspan)
    });
    let eoi: SimpleSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let parser = file_parser(source);
    let (file, parse_errors) = parser.parse(stream).into_output_errors();

    // Merge lex errors + parse errors.
    let mut all_errors: Vec<Rich<'static, Token, SimpleSpan>> = lex_result
        .errors
        .into_iter()
        .map(|e| {
            let span: SimpleSpan = (e.span.start..e.span.end).into();
            Rich::custom(span, e.message)
        })
        .collect();
    all_errors.extend(parse_errors.into_iter().map(|e| e.into_owned()));

    // Duplicate variable names within one frame block are a parse-stage
    // error: the block is malformed regardless of downstream semantics.
    if let Some(file) = &file {
        check_duplicate_variables(file, &mut all_errors);
    }

    ParseResult {
        file,
        errors: all_errors,
    }
}

fn check_duplicate_variables(
    file: &StructureFile,
    errors: &mut Vec<Rich<'static, Token, SimpleSpan>>,
) {
    for frame in &file.frames {
        let mut seen: HashMap<&str, SimpleSpan> = HashMap::new();
        for var in &frame.variables {
            if let Some(first) = seen.get(var.name.name.as_str()) {
                errors.push(Rich::custom(
                    var.name.span,
                    format!(
                        "duplicate variable '{}' in frame {} (first declared at offset {})",
                        var.name.name,
                        frame.index,
                        first.start
                    ),
                ));
            } else {
                seen.insert(&var.name.name, var.name.span);
            }
        }
    }
}

// ── Main parser builder ──
//
// All grammar rules are built inside `file_parser` so that the `source`
// reference is captured once and shared by all combinators. This avoids
// complex lifetime annotations on per-rule helper functions.

fn file_parser<'tokens, 'src: 'tokens, I>(
    source: &'src str,
) -> impl Parser<'tokens, I, StructureFile, extra::Err<Rich<'tokens, Token, SimpleSpan>>> + 'src
where
    'tokens: 'src,
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    // ── Identifier ──

    let ident = just(Token::Ident).map_with(move |_, e| {
        let span: SimpleSpan = e.span();
        Ident {
            name: source[span.start()..span.end()].to_string(),
            span,
        }
    });

    // ── Non-negative integer (frame index, cardinality, track index) ──

    let uint = select! {
        Token::Int(n) = e if n >= 0 && n <= u32::MAX as i64 => (n as u32, e.span()),
    };

    // ── Signed offset within i32 range ──

    let offset = select! {
        Token::Int(n) = e => (n, e.span()),
    }
    .try_map(|(n, span), _| {
        if n < i32::MIN as i64 || n > i32::MAX as i64 {
            Err(Rich::custom(span, format!("time offset {n} out of range")))
        } else {
            Ok(n as i32)
        }
    });

    // ── Quoted table name: '(' STRING ')' ──

    let table_name = select! {
        Token::StringLit(s) = e => (s, e.span()),
    }
    .delimited_by(just(Token::LParen), just(Token::RParen));

    // ── Table reference ──
    //
    // Known kinds: DenseCPT (dense conditional table) and mixture collection.
    // An identifier in kind position is an undeclared table kind — rejected
    // here so the error names the offending kind.

    let dense_table = just(Token::DenseCpt)
        .ignore_then(table_name.clone())
        .map_with(|(name, name_span), e| TableRef::Dense {
            name,
            name_span,
            span: e.span(),
        });

    let mixture_table = just(Token::Mixture)
        .ignore_then(just(Token::Collection))
        .ignore_then(table_name.clone())
        .then(
            just(Token::Mapping)
                .ignore_then(table_name.clone())
                .or_not(),
        )
        .map_with(|((collection, collection_span), mapping), e| TableRef::Mixture {
            collection,
            collection_span,
            mapping: mapping.map(|(m, _)| m),
            span: e.span(),
        });

    let unknown_table = ident
        .clone()
        .then(table_name.clone())
        .try_map(|(kind, _), span| {
            Err(Rich::custom(
                span,
                format!(
                    "undeclared parameter-table kind '{}' (expected DenseCPT or mixture collection)",
                    kind.name
                ),
            ))
        });

    let table_ref = dense_table.or(mixture_table).or(unknown_table);

    // ── Time-offset parent reference: IDENT '(' INT ')' ──

    let time_offset_ref = ident
        .clone()
        .then(offset.delimited_by(just(Token::LParen), just(Token::RParen)))
        .map_with(|(name, offset), e| TimeOffsetRef {
            name,
            offset,
            span: e.span(),
        });

    // ── Parent list: 'nil' or comma-separated references ──

    let parent_list = just(Token::Nil).to(Vec::new()).or(time_offset_ref
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>());

    // ── Parents clause ──

    let parents_clause = just(Token::ConditionalParents)
        .ignore_then(just(Token::Colon))
        .ignore_then(parent_list)
        .then_ignore(just(Token::Using))
        .then(table_ref)
        .then_ignore(just(Token::Semicolon))
        .map_with(|(parents, table), e| ParentsClause {
            parents,
            table,
            span: e.span(),
        });

    // ── Type clause ──

    let cardinality = select! {
        Token::Int(n) = e if n > 0 && n <= u32::MAX as i64 => (n as u32, e.span()),
    };

    let discrete_type = just(Token::Discrete)
        .ignore_then(just(Token::Hidden))
        .ignore_then(just(Token::Cardinality))
        .ignore_then(cardinality)
        .map_with(|(cardinality, card_span), e| TypeClause::Discrete {
            cardinality,
            card_span,
            span: e.span(),
        });

    let continuous_type = just(Token::Continuous)
        .ignore_then(just(Token::Observed))
        .ignore_then(uint)
        .then_ignore(just(Token::Colon))
        .then(uint)
        .try_map(|((start, start_span), (end, _)), span| {
            if end < start {
                Err(Rich::custom(
                    start_span,
                    format!("observation-track range {start}:{end} is empty"),
                ))
            } else {
                Ok((start, end, span))
            }
        })
        .map(|(track_start, track_end, span)| TypeClause::Continuous {
            track_start,
            track_end,
            span,
        });

    let type_clause = just(Token::Type)
        .ignore_then(just(Token::Colon))
        .ignore_then(discrete_type.or(continuous_type))
        .then_ignore(just(Token::Semicolon));

    // ── Variable block ──
    //
    // The type clause is mandatory and comes first; the grammar itself
    // rejects a variable block without one.

    let variable_block = just(Token::Variable)
        .ignore_then(just(Token::Colon))
        .ignore_then(ident.clone())
        .then(
            type_clause
                .then(parents_clause.or_not())
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map_with(|(name, (ty, parents)), e| VariableBlock {
            name,
            ty,
            parents,
            span: e.span(),
        });

    // ── Frame block ──

    let frame_block = just(Token::Frame)
        .ignore_then(just(Token::Colon))
        .ignore_then(uint)
        .then(
            variable_block
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map_with(|((index, index_span), variables), e| FrameBlock {
            index,
            index_span,
            variables,
            span: e.span(),
        });

    // ── Chunk directive ──

    let chunk = just(Token::Chunk)
        .ignore_then(uint)
        .then_ignore(just(Token::Colon))
        .then(uint)
        .map_with(|((start, _), (end, _)), e| ChunkDirective {
            start,
            end,
            span: e.span(),
        });

    // ── File ──

    just(Token::GraphicalModel)
        .ignore_then(ident)
        .then(frame_block.repeated().at_least(1).collect::<Vec<_>>())
        .then(chunk.or_not())
        .map_with(|((model_name, frames), chunk), e| StructureFile {
            model_name,
            frames,
            chunk,
            span: e.span(),
        })
}

// ── Tests ──
