//! Core evaluator: exhaustive dispatch over the DICE AST.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::natives;
use crate::output::OutputSink;
use crate::task::{TaskGroup, TaskUnitDef};
use crate::value::{Function, Value};
use dice_types::{BinOp, Node};
use std::sync::Arc;
use std::time::Instant;

/// Result of evaluating one node: either a plain value or a `return` in
/// flight. Every composite construct propagates `Return` without running its
/// remaining children; a function-call boundary converts it back into a plain
/// value. A `Return` that reaches the top of the program is the
/// [`EvalError::MisplacedReturn`] error.
#[derive(Debug, Clone)]
pub enum Flow {
    Value(Value),
    Return(Value),
}

/// Unwrap a plain value, or propagate an in-flight `return` to the caller.
macro_rules! value_of {
    ($flow:expr) => {
        match $flow {
            Flow::Value(v) => v,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    };
}

/// The DICE evaluator.
///
/// Owns the global scope (native table plus top-level definitions) and the
/// output sink. Evaluation takes `&self` with the environment passed
/// explicitly, so the evaluator is shared by plain reference across parallel
/// workers.
pub struct Evaluator {
    globals: Arc<Environment>,
    output: OutputSink,
}

impl Evaluator {
    /// Evaluator writing program output to stdout.
    pub fn new() -> Self {
        Self::with_output(OutputSink::Stdout)
    }

    /// Evaluator with an explicit output sink (tests use a capture sink).
    pub fn with_output(output: OutputSink) -> Self {
        let globals = Environment::root();
        natives::install(&globals);
        Self { globals, output }
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    /// Run a whole program: execute its top-level statements against the
    /// global scope, then invoke `main()` with no arguments if one was
    /// defined. Yields `main`'s value, or `Unit` without a `main`.
    pub fn run(&self, program: &Node) -> EvalResult<Value> {
        let Node::Program(statements) = program else {
            return Err(EvalError::Internal(format!(
                "run expects a program node, got {}",
                program.kind_name()
            )));
        };
        for statement in statements {
            if let Flow::Return(_) = self.eval(statement, &self.globals)? {
                return Err(EvalError::MisplacedReturn);
            }
        }
        match self.globals.get("main") {
            Some(Value::Closure(main)) => self.call_function(&main, Vec::new()),
            _ => Ok(Value::Unit),
        }
    }

    /// Evaluate a single node in `env`.
    pub fn eval(&self, node: &Node, env: &Arc<Environment>) -> EvalResult<Flow> {
        match node {
            Node::Program(statements) | Node::Block(statements) => {
                self.eval_block(statements, env)
            }
            Node::NumberLit(n) => Ok(Flow::Value(Value::Number(*n))),
            Node::StringLit(s) => Ok(Flow::Value(Value::String(s.clone()))),
            Node::BoolLit(b) => Ok(Flow::Value(Value::Bool(*b))),
            Node::Identifier(name) => match env.get(name) {
                Some(value) => Ok(Flow::Value(value)),
                None => Err(EvalError::NameNotFound(name.clone())),
            },
            Node::Assign { name, value } => {
                let value = value_of!(self.eval(value, env)?);
                Ok(Flow::Value(env.set(name, value)))
            }
            Node::Binary { left, op, right } => self.eval_binary(left, *op, right, env),
            Node::Sequence { left, right } => {
                // `->` is the sole ordering primitive: the left side completes
                // fully, joins included, before the right side starts.
                value_of!(self.eval(left, env)?);
                self.eval(right, env)
            }
            Node::If {
                condition,
                then_block,
                else_block,
            } => self.eval_if(condition, then_block, else_block.as_deref(), env),
            Node::Loop { var, range, body } => self.eval_loop(var, range, body, env),
            Node::Range { .. } => Err(EvalError::Internal(
                "range outside of a loop header".into(),
            )),
            Node::Return(expr) => {
                let value = match expr {
                    Some(expr) => value_of!(self.eval(expr, env)?),
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }
            Node::FunctionDef { name, params, body } => {
                env.set(
                    name,
                    Value::Closure(Arc::new(Function {
                        name: name.clone(),
                        params: params.clone(),
                        body: (**body).clone(),
                    })),
                );
                Ok(Flow::Value(Value::Unit))
            }
            Node::TaskUnitDef { name, methods } => {
                env.set(
                    name,
                    Value::TaskUnit(Arc::new(TaskUnitDef::new(name.clone(), methods))),
                );
                Ok(Flow::Value(Value::Unit))
            }
            Node::Parallel(statements) => self.eval_parallel(statements, env),
            Node::ParallelLoop { var, range, body } => {
                self.eval_parallel_loop(var, range, body, env)
            }
            Node::Call { callee, args } => self.eval_call(callee, args, env),
            Node::Member { object, member } => self.eval_member(object, member, env),
            Node::Timed { inner, tag } => self.eval_timed(inner, tag.as_deref(), env),
        }
    }

    /// Run statements in order in the given scope. A block itself has no
    /// value; an in-flight `return` skips the remaining statements.
    fn eval_block(&self, statements: &[Node], env: &Arc<Environment>) -> EvalResult<Flow> {
        for statement in statements {
            value_of!(self.eval(statement, env)?);
        }
        Ok(Flow::Value(Value::Unit))
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(
        &self,
        left: &Node,
        op: BinOp,
        right: &Node,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let lhs = value_of!(self.eval(left, env)?);
        let rhs = value_of!(self.eval(right, env)?);
        let value = match op {
            BinOp::Add => arith(&lhs, &rhs, op, |a, b| a + b)?,
            BinOp::Sub => arith(&lhs, &rhs, op, |a, b| a - b)?,
            BinOp::Mul => arith(&lhs, &rhs, op, |a, b| a * b)?,
            BinOp::Div => {
                let (Value::Number(a), Value::Number(b)) = (&lhs, &rhs) else {
                    return Err(operand_mismatch(&lhs, op, &rhs));
                };
                if *b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Value::Number(a / b)
            }
            BinOp::Eq => Value::Bool(lhs.structural_eq(&rhs)),
            BinOp::NotEq => Value::Bool(!lhs.structural_eq(&rhs)),
            BinOp::Less => compare(&lhs, &rhs, op, |a, b| a < b)?,
            BinOp::Greater => compare(&lhs, &rhs, op, |a, b| a > b)?,
            BinOp::LessEq => compare(&lhs, &rhs, op, |a, b| a <= b)?,
            BinOp::GreaterEq => compare(&lhs, &rhs, op, |a, b| a >= b)?,
        };
        Ok(Flow::Value(value))
    }

    // ── Control flow ─────────────────────────────────────────────────────

    /// Branches run in the *same* environment as the `If` node itself, so
    /// assignments inside a branch are visible after it completes.
    fn eval_if(
        &self,
        condition: &Node,
        then_block: &Node,
        else_block: Option<&Node>,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let condition = value_of!(self.eval(condition, env)?);
        let Value::Bool(condition) = condition else {
            return Err(EvalError::TypeMismatch(format!(
                "if condition must be a boolean, got {}",
                condition.type_name()
            )));
        };
        if condition {
            self.eval(then_block, env)
        } else if let Some(else_block) = else_block {
            self.eval(else_block, env)
        } else {
            Ok(Flow::Value(Value::Unit))
        }
    }

    /// Sequential loop: one child scope reused across iterations, so later
    /// iterations see earlier assignments; the loop variable is rebound each
    /// iteration.
    fn eval_loop(
        &self,
        var: &str,
        range: &Node,
        body: &Node,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let steps = match self.range_steps(range, env)? {
            Flow2::Value(steps) => steps,
            Flow2::Return(value) => return Ok(Flow::Return(value)),
        };
        let scope = Environment::child(env);
        for i in steps {
            scope.set(var, Value::Number(i as f64));
            value_of!(self.eval(body, &scope)?);
        }
        Ok(Flow::Value(Value::Unit))
    }

    /// Evaluate a loop header to the integral values it produces, in order.
    /// Non-integral bounds truncate toward zero.
    pub(crate) fn range_steps(
        &self,
        range: &Node,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow2<std::ops::Range<i64>>> {
        let Node::Range {
            start,
            end,
            inclusive,
        } = range
        else {
            return Err(EvalError::Internal(format!(
                "loop range must be a range node, got {}",
                range.kind_name()
            )));
        };
        let start = match self.eval(start, env)? {
            Flow::Value(v) => expect_number(&v, "range start")?,
            Flow::Return(v) => return Ok(Flow2::Return(v)),
        };
        let end = match self.eval(end, env)? {
            Flow::Value(v) => expect_number(&v, "range end")?,
            Flow::Return(v) => return Ok(Flow2::Return(v)),
        };
        let start = start.trunc() as i64;
        let end = end.trunc() as i64;
        let end = if *inclusive { end + 1 } else { end };
        Ok(Flow2::Value(start..end))
    }

    // ── Calls & member access ────────────────────────────────────────────

    fn eval_call(
        &self,
        callee: &Node,
        args: &[Node],
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        // `parallelTasks` is intercepted before normal call resolution: its
        // arguments are taskunit *identifiers*, not evaluated expressions.
        if let Node::Identifier(name) = callee {
            if name == "parallelTasks" {
                return self.make_task_group(args, env).map(Flow::Value);
            }
        }
        let callee_value = value_of!(self.eval(callee, env)?);
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(value_of!(self.eval(arg, env)?));
        }
        match callee_value {
            Value::Native(native) => native.call(arg_values, &self.output).map(Flow::Value),
            Value::Closure(function) => {
                self.call_function(&function, arg_values).map(Flow::Value)
            }
            Value::GroupNext(group) => {
                if !arg_values.is_empty() {
                    return Err(EvalError::ArityMismatch(format!(
                        "next takes 0 argument(s), got {}",
                        arg_values.len()
                    )));
                }
                group.next(self, env)?;
                Ok(Flow::Value(Value::Unit))
            }
            other => {
                let what = match callee {
                    Node::Identifier(name) => format!("'{name}'"),
                    _ => format!("a value of type {}", other.type_name()),
                };
                Err(EvalError::NotCallable(what))
            }
        }
    }

    /// Call a user function: exact arity, parameters bound into a fresh child
    /// of the global scope, an in-flight `return` absorbed here.
    pub(crate) fn call_function(
        &self,
        function: &Function,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        if args.len() != function.params.len() {
            return Err(EvalError::ArityMismatch(format!(
                "{} takes {} argument(s), got {}",
                function.name,
                function.params.len(),
                args.len()
            )));
        }
        let scope = Environment::child(&self.globals);
        for (param, arg) in function.params.iter().zip(args) {
            scope.set(param, arg);
        }
        match self.eval(&function.body, &scope)? {
            Flow::Return(value) => Ok(value),
            Flow::Value(_) => Ok(Value::Unit),
        }
    }

    fn make_task_group(&self, args: &[Node], env: &Arc<Environment>) -> EvalResult<Value> {
        let mut defs = Vec::with_capacity(args.len());
        for arg in args {
            let Node::Identifier(name) = arg else {
                return Err(EvalError::TypeMismatch(
                    "parallelTasks expects taskunit identifiers as arguments".into(),
                ));
            };
            match env.get(name) {
                Some(Value::TaskUnit(def)) => defs.push(def),
                Some(other) => {
                    return Err(EvalError::TypeMismatch(format!(
                        "argument '{name}' to parallelTasks is not a taskunit, got {}",
                        other.type_name()
                    )));
                }
                None => return Err(EvalError::NameNotFound(name.clone())),
            }
        }
        Ok(Value::TaskGroup(Arc::new(TaskGroup::new(defs))))
    }

    /// Member access resolves a small capability set: a taskgroup exposes
    /// exactly `next`. Anything else is unsupported.
    fn eval_member(
        &self,
        object: &Node,
        member: &str,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let object = value_of!(self.eval(object, env)?);
        match object {
            Value::TaskGroup(group) => {
                if member == "next" {
                    Ok(Flow::Value(Value::GroupNext(group)))
                } else {
                    Err(EvalError::AttributeNotSupported {
                        receiver: "taskgroup".into(),
                        member: member.to_string(),
                    })
                }
            }
            other => Err(EvalError::TypeMismatch(format!(
                "value of type {} does not support member access",
                other.type_name()
            ))),
        }
    }

    // ── Timing instrumentation ───────────────────────────────────────────

    /// `@timed` wraps any construct: measure wall-clock duration through the
    /// normal dispatcher and emit a labeled report line. Nested `@timed`
    /// blocks each report; the outer duration covers the inner one.
    fn eval_timed(
        &self,
        inner: &Node,
        tag: Option<&str>,
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let label = tag.unwrap_or_else(|| default_timed_label(inner));
        let start = Instant::now();
        let flow = self.eval(inner, env)?;
        let elapsed = start.elapsed().as_secs_f64();
        tracing::trace!(label, elapsed, "timed report");
        self.output.emit(format!("[TIMED: {label}] {elapsed:.4}s"));
        Ok(flow)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Like [`Flow`] but carrying an arbitrary payload in the value position,
/// for helpers that compute something other than a [`Value`].
pub(crate) enum Flow2<T> {
    Value(T),
    Return(Value),
}

fn default_timed_label(node: &Node) -> &'static str {
    match node {
        Node::Call { .. } => "function",
        Node::Block(_) => "block",
        Node::Parallel(_) => "parallel",
        other => other.kind_name(),
    }
}

fn expect_number(value: &Value, what: &str) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeMismatch(format!(
            "{what} must be a number, got {}",
            other.type_name()
        ))),
    }
}

fn operand_mismatch(lhs: &Value, op: BinOp, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{}' to {} and {}",
        op.symbol(),
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn arith(lhs: &Value, rhs: &Value, op: BinOp, apply: fn(f64, f64) -> f64) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(*a, *b))),
        _ => Err(operand_mismatch(lhs, op, rhs)),
    }
}

fn compare(lhs: &Value, rhs: &Value, op: BinOp, apply: fn(f64, f64) -> bool) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(apply(*a, *b))),
        _ => Err(operand_mismatch(lhs, op, rhs)),
    }
}
