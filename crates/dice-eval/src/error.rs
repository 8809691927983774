//! Runtime error types for the DICE evaluator.

use thiserror::Error;

/// Evaluation error.
///
/// Every variant is irrecoverable for the interpreted program: it aborts the
/// current unit of evaluation outward until it reaches the runtime's caller.
/// Only the non-local `return` signal is absorbed on the way, at function-call
/// boundaries, and that is not an error (see [`crate::evaluator::Flow`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Identifier absent from the whole scope chain.
    #[error("name '{0}' is not defined")]
    NameNotFound(String),
    /// Operator, call, or member access applied to the wrong kind of value.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("division by zero")]
    DivisionByZero,
    /// Call argument count does not match the declared arity.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),
    /// Member name not recognized for the receiver.
    #[error("attribute '{member}' not supported on {receiver}")]
    AttributeNotSupported { receiver: String, member: String },
    #[error("{0} is not callable")]
    NotCallable(String),
    /// A `return` unwound past every function-call boundary.
    #[error("'return' outside of a function")]
    MisplacedReturn,
    /// Malformed tree or a panicked worker. Never occurs with a well-formed
    /// AST from the parser pipeline.
    #[error("internal evaluator error: {0}")]
    Internal(String),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
