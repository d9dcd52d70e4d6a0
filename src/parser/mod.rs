//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split over `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Supported C
//!
//! The dialect found in Plan 9 linker sources:
//! - Types: every keyword type, structs, unions, enums, typedef names,
//!   pointers, arrays, pointers to functions
//! - Declarations: definitions, prototypes, multiple declarators,
//!   initializer lists, block-scope declarations and prototypes
//! - Statements: all of C, with `case`/`default` as standalone labels
//! - Expressions: all of C, parentheses preserved
//! - Preprocessor lines are skipped, not expanded
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser, TypeNames};
