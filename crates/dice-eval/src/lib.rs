//! DICE tree-walking evaluator.
//!
//! Executes DICE programs directly from the AST handed over by the external
//! lexer/parser pipeline. The defining feature of the language is structured
//! concurrency: `->` sequencing, `p { }` fork-join blocks, `p loop` parallel
//! iteration, and barrier-stepped `taskunit` groups driven by `.next()`.
//!
//! Concurrency is real: forked branches run on OS threads inside a structured
//! scope that joins every worker exactly once, including on the error path.
//! Scoping stays deterministic under that concurrency because writes never
//! escape the current scope — a nested assignment shadows an outer binding,
//! it never mutates it.

pub mod env;
pub mod error;
pub mod evaluator;
pub mod natives;
pub mod output;
pub mod parallel;
pub mod task;
pub mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, Flow};
pub use natives::NativeFn;
pub use output::OutputSink;
pub use task::{TaskGroup, TaskUnitDef, TaskUnitInstance};
pub use value::{Function, Value};
