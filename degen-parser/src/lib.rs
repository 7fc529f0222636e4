//! A hand-rolled recursive-descent parser for the reference frontend's
//! concrete surface syntax (see `DESIGN.md`, Open Question 3): Go, plus
//! `type`-prefixed inline type parameter declarations and call-shaped
//! generic instantiation.
//!
//! One `Parser` struct, one `impl` block in `parser.rs`, with a `thiserror`
//! `ParseError`: declarations, types, statements, and expressions each get
//! their own run of `parse_*` functions in that top-down order, rather than
//! a submodule per construct, since every level calls back into every other
//! (a type can embed a call, a statement can embed a composite literal of a
//! type, and so on) and splitting them apart would mostly just relocate
//! that mutual recursion behind module boundaries. Grounded in the literal
//! grammar shown by `examples/original_source/test/*.go` and
//! `examples/original_source/examples/*/*.go` (see `DESIGN.md`'s
//! dependency-drops section for why this crate carries no parser-generator
//! dependency).

mod parser;

pub use parser::Parser;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{location}: unexpected token: {message}")]
    SyntaxError { location: String, message: String },
    #[error("lexer error: {0}")]
    LexerError(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
}
