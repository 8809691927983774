//! Chained scope environment for the DICE evaluator.

use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A lexical scope chained to an optional outer scope.
///
/// `get` searches this scope and then walks the outer chain; `set` always
/// writes into this scope, so reassigning a name in a nested scope shadows
/// the enclosing binding instead of mutating it. This is the invariant that
/// makes environment sharing safe under fork-join: parallel branches each get
/// their own child scope and only ever *read* through the shared ancestors,
/// which nothing writes to while the branches run.
#[derive(Debug)]
pub struct Environment {
    bindings: RwLock<HashMap<String, Value>>,
    outer: Option<Arc<Environment>>,
}

impl Environment {
    /// Create a root scope with no outer chain.
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            bindings: RwLock::new(HashMap::new()),
            outer: None,
        })
    }

    /// Allocate an empty scope chained to `outer`.
    pub fn child(outer: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            bindings: RwLock::new(HashMap::new()),
            outer: Some(Arc::clone(outer)),
        })
    }

    /// Look up a name, searching from this scope outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.read().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Create or overwrite a binding in this scope only. Returns the value,
    /// since assignment is an expression.
    pub fn set(&self, name: &str, value: Value) -> Value {
        self.bindings
            .write()
            .insert(name.to_string(), value.clone());
        value
    }
}
