//! AST node types for the DICE language.
//!
//! The tree is produced by an external lexer/parser pipeline and consumed by
//! the evaluator. Structural legality is the parser's job: by the time a tree
//! reaches the evaluator, assignment targets are plain names and `Range`
//! nodes appear only in loop headers. Large recursive types are boxed to keep
//! the enum size reasonable.

use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

/// A single AST node. The set of variants is closed; the evaluator matches
/// exhaustively over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// The root of a source file: its top-level statements.
    Program(Vec<Node>),
    /// `{ stmt; stmt; ... }`
    Block(Vec<Node>),
    /// `func name(params) { body }`
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
    },
    /// `taskunit Name { step1() { ... } step2() { ... } }`
    TaskUnitDef { name: String, methods: Vec<Method> },
    /// `p { stmt; stmt; ... }` — one concurrent unit per immediate statement.
    Parallel(Vec<Node>),
    /// `p loop var in range { body }` — one concurrent unit per range value.
    ParallelLoop {
        var: String,
        range: Box<Node>,
        body: Box<Node>,
    },
    /// `left -> right`
    Sequence { left: Box<Node>, right: Box<Node> },
    /// `callee(args)`
    Call { callee: Box<Node>, args: Vec<Node> },
    /// `object.member`
    Member { object: Box<Node>, member: String },
    Identifier(String),
    StringLit(String),
    NumberLit(f64),
    BoolLit(bool),
    /// `name = value` — the target is always a simple name.
    Assign { name: String, value: Box<Node> },
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then_block: Box<Node>,
        else_block: Option<Box<Node>>,
    },
    /// `loop var in range { body }`
    Loop {
        var: String,
        range: Box<Node>,
        body: Box<Node>,
    },
    /// `start..end` (exclusive) or `start..=end` (inclusive).
    Range {
        start: Box<Node>,
        end: Box<Node>,
        inclusive: bool,
    },
    /// `return expr` — `None` for a bare `return`.
    Return(Option<Box<Node>>),
    /// `@timed` / `@timed("tag")` wrapping a construct.
    Timed {
        inner: Box<Node>,
        tag: Option<String>,
    },
}

impl Node {
    /// Human-readable name of the node kind, used for diagnostics and as the
    /// fallback `@timed` label.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Program(_) => "program",
            Node::Block(_) => "block",
            Node::FunctionDef { .. } => "function definition",
            Node::TaskUnitDef { .. } => "taskunit definition",
            Node::Parallel(_) => "parallel",
            Node::ParallelLoop { .. } => "parallel loop",
            Node::Sequence { .. } => "sequence",
            Node::Call { .. } => "call",
            Node::Member { .. } => "member access",
            Node::Identifier(_) => "identifier",
            Node::StringLit(_) => "string",
            Node::NumberLit(_) => "number",
            Node::BoolLit(_) => "boolean",
            Node::Assign { .. } => "assignment",
            Node::Binary { .. } => "binary op",
            Node::If { .. } => "if",
            Node::Loop { .. } => "loop",
            Node::Range { .. } => "range",
            Node::Return(_) => "return",
            Node::Timed { .. } => "timed",
        }
    }
}

/// A named method inside a `taskunit` definition (`step1`, `step2`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub body: Node,
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

/// Binary operators. Precedence is the parser's concern; the evaluator sees
/// an already-shaped tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
}

impl BinOp {
    /// The operator's source spelling, for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
        }
    }
}
