//! Runtime value model for the DICE evaluator.

use crate::natives::NativeFn;
use crate::task::{TaskGroup, TaskUnitDef};
use dice_types::Node;
use std::fmt;
use std::sync::Arc;

/// A user-defined function: the AST of its definition.
///
/// DICE functions capture no lexical environment. Parameters are bound fresh
/// into a child of the *global* scope on every call, so a function body sees
/// globals and its own locals, never the caller's scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Node,
}

/// A runtime value. Cloning is cheap: compound values are behind `Arc`.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    /// The absence of a value: statement results, calls without `return`.
    Unit,
    Closure(Arc<Function>),
    Native(NativeFn),
    /// A `taskunit` definition, registered once and shared by every group
    /// instantiated from it.
    TaskUnit(Arc<TaskUnitDef>),
    /// The group produced by `parallelTasks(...)`.
    TaskGroup(Arc<TaskGroup>),
    /// `group.next`, resolved but not yet called.
    GroupNext(Arc<TaskGroup>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Unit => "unit",
            Value::Closure(_) => "function",
            Value::Native(_) => "native function",
            Value::TaskUnit(_) => "taskunit",
            Value::TaskGroup(_) => "taskgroup",
            Value::GroupNext(_) => "bound method",
        }
    }

    /// Equality for `==`/`!=`. NaN is not equal to NaN; callables, task
    /// units, and groups never compare equal; mixed kinds are unequal.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => !a.is_nan() && !b.is_nan() && a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Rendering used by `print` and the sensor primitive. Integral numbers
    /// keep a trailing `.0` (`print(1)` emits `1.0`), matching the reference
    /// runtime's float formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Unit => write!(f, "unit"),
            Value::Closure(func) => write!(f, "<func {}>", func.name),
            Value::Native(native) => write!(f, "<native {}>", native.name()),
            Value::TaskUnit(def) => write!(f, "<taskunit {}>", def.name()),
            Value::TaskGroup(group) => write!(f, "<taskgroup of {}>", group.len()),
            Value::GroupNext(_) => write!(f, "<bound method next>"),
        }
    }
}
