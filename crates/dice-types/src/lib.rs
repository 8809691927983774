//! Shared types for the DICE runtime.
//!
//! The lexer and parser live outside this workspace; they hand the evaluator
//! a finished [`ast::Node`] tree. The AST derives serde so a front end can
//! ship trees across a process boundary as JSON.

pub mod ast;

pub use ast::{BinOp, Method, Node};
