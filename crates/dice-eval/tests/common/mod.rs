//! Shared AST builders and a capture harness for evaluator tests.
//!
//! The parser pipeline lives outside this workspace, so tests build trees
//! directly. The harness runs a program against a capturing output sink and
//! exposes the emitted lines for assertions.

#![allow(dead_code)]

use dice_eval::{EvalResult, Evaluator, OutputSink, Value};
use dice_types::{BinOp, Method, Node};

// ── Node builders ────────────────────────────────────────────────────────

pub fn num(n: f64) -> Node {
    Node::NumberLit(n)
}

pub fn str_lit(s: &str) -> Node {
    Node::StringLit(s.into())
}

pub fn boolean(b: bool) -> Node {
    Node::BoolLit(b)
}

pub fn ident(name: &str) -> Node {
    Node::Identifier(name.into())
}

pub fn assign(name: &str, value: Node) -> Node {
    Node::Assign {
        name: name.into(),
        value: Box::new(value),
    }
}

pub fn binary(left: Node, op: BinOp, right: Node) -> Node {
    Node::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn call(callee: Node, args: Vec<Node>) -> Node {
    Node::Call {
        callee: Box::new(callee),
        args,
    }
}

pub fn call_name(name: &str, args: Vec<Node>) -> Node {
    call(ident(name), args)
}

pub fn print(args: Vec<Node>) -> Node {
    call_name("print", args)
}

pub fn wait(seconds: f64) -> Node {
    call_name("wait", vec![num(seconds)])
}

pub fn seq(left: Node, right: Node) -> Node {
    Node::Sequence {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn block(statements: Vec<Node>) -> Node {
    Node::Block(statements)
}

pub fn program(statements: Vec<Node>) -> Node {
    Node::Program(statements)
}

pub fn func(name: &str, params: &[&str], body: Vec<Node>) -> Node {
    Node::FunctionDef {
        name: name.into(),
        params: params.iter().map(|p| (*p).to_string()).collect(),
        body: Box::new(block(body)),
    }
}

pub fn main_fn(body: Vec<Node>) -> Node {
    func("main", &[], body)
}

pub fn ret(expr: Node) -> Node {
    Node::Return(Some(Box::new(expr)))
}

pub fn ret_unit() -> Node {
    Node::Return(None)
}

pub fn if_then(condition: Node, then_block: Vec<Node>) -> Node {
    Node::If {
        condition: Box::new(condition),
        then_block: Box::new(block(then_block)),
        else_block: None,
    }
}

pub fn if_else(condition: Node, then_block: Vec<Node>, else_block: Vec<Node>) -> Node {
    Node::If {
        condition: Box::new(condition),
        then_block: Box::new(block(then_block)),
        else_block: Some(Box::new(block(else_block))),
    }
}

pub fn range(start: f64, end: f64, inclusive: bool) -> Node {
    Node::Range {
        start: Box::new(num(start)),
        end: Box::new(num(end)),
        inclusive,
    }
}

pub fn loop_(var: &str, range: Node, body: Vec<Node>) -> Node {
    Node::Loop {
        var: var.into(),
        range: Box::new(range),
        body: Box::new(block(body)),
    }
}

pub fn ploop(var: &str, range: Node, body: Vec<Node>) -> Node {
    Node::ParallelLoop {
        var: var.into(),
        range: Box::new(range),
        body: Box::new(block(body)),
    }
}

pub fn parallel(statements: Vec<Node>) -> Node {
    Node::Parallel(statements)
}

pub fn taskunit(name: &str, methods: Vec<(&str, Vec<Node>)>) -> Node {
    Node::TaskUnitDef {
        name: name.into(),
        methods: methods
            .into_iter()
            .map(|(name, body)| Method {
                name: name.into(),
                body: block(body),
            })
            .collect(),
    }
}

pub fn member(object: Node, member: &str) -> Node {
    Node::Member {
        object: Box::new(object),
        member: member.into(),
    }
}

pub fn timed(inner: Node, tag: Option<&str>) -> Node {
    Node::Timed {
        inner: Box::new(inner),
        tag: tag.map(str::to_string),
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

/// An evaluator wired to a capturing output sink.
pub struct Harness {
    evaluator: Evaluator,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::with_output(OutputSink::capture()),
        }
    }

    /// Wrap `statements` in a program node and run it.
    pub fn run(&self, statements: Vec<Node>) -> EvalResult<Value> {
        self.evaluator.run(&program(statements))
    }

    /// Lines emitted so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.evaluator.output().lines()
    }
}

/// Run statements and return the result together with the emitted lines.
pub fn run_capture(statements: Vec<Node>) -> (EvalResult<Value>, Vec<String>) {
    let harness = Harness::new();
    let result = harness.run(statements);
    (result, harness.lines())
}

/// Extract the number out of a value; panics on any other kind.
pub fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        other => panic!("expected a number, got {}", other.type_name()),
    }
}

/// Split a `[TIMED: <label>] <secs>s` report into its label and duration,
/// checking the 4-decimal format on the way.
pub fn parse_timed_line(line: &str) -> (String, f64) {
    let rest = line
        .strip_prefix("[TIMED: ")
        .unwrap_or_else(|| panic!("not a timed report: {line}"));
    let (label, duration) = rest
        .split_once("] ")
        .unwrap_or_else(|| panic!("malformed timed report: {line}"));
    let duration = duration
        .strip_suffix('s')
        .unwrap_or_else(|| panic!("malformed timed report: {line}"));
    let decimals = duration
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0);
    assert_eq!(decimals, 4, "duration not reported to 4 decimals: {line}");
    (
        label.to_string(),
        duration.parse().expect("duration parses as f64"),
    )
}
