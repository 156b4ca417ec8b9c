// gmc — Graphical Model Compiler
//
// Library root. Unrolls .str frame-template structure files into explicit
// per-position inference graphs.

pub mod ast;
pub mod bind;
pub mod diag;
pub mod dot;
pub mod frame;
pub mod id;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod unroll;
pub mod validate;
