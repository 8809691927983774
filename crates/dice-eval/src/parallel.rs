//! Fork-join parallel execution.
//!
//! `p { ... }` spawns one worker per immediate statement; `p loop` spawns one
//! worker per range value. Every worker gets its own fresh child scope rooted
//! at the enclosing environment, runs on an OS thread inside a structured
//! scope, and is joined exactly once before the construct completes — on the
//! error path too: a failing branch never abandons its siblings mid-flight,
//! the first failure surfaces only after every worker has joined.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::evaluator::{Evaluator, Flow, Flow2};
use crate::value::Value;
use dice_types::Node;
use std::sync::Arc;
use std::thread;

impl Evaluator {
    /// `p { stmt; stmt; ... }` — one worker per statement, join all.
    pub(crate) fn eval_parallel(
        &self,
        statements: &[Node],
        env: &Arc<Environment>,
    ) -> EvalResult<Flow> {
        let units: Vec<(Arc<Environment>, &Node)> = statements
            .iter()
            .map(|statement| (Environment::child(env), statement))
            .collect();
        tracing::debug!(workers = units.len(), "parallel block fan-out");
        self.fork_join(units)?;
        Ok(Flow::Value(Value::Unit))
    }

    /// `p loop var in range { body }` — one worker per range value, with the
    /// loop variable pre-bound in each worker's own scope, join all.
    /// Completion order across workers is unspecified.
    pub(crate) fn eval_parallel_loop(
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
        let units: Vec<(Arc<Environment>, &Node)> = steps
            .map(|i| {
                let scope = Environment::child(env);
                scope.set(var, Value::Number(i as f64));
                (scope, body)
            })
            .collect();
        tracing::debug!(workers = units.len(), "parallel loop fan-out");
        self.fork_join(units)?;
        Ok(Flow::Value(Value::Unit))
    }

    /// Spawn one worker per `(scope, node)` unit and join them all.
    ///
    /// A `return` inside a branch terminates only that branch: the in-flight
    /// `Flow::Return` is absorbed at the join and never crosses the fork
    /// boundary. Errors are collected after all workers have joined and the
    /// first one (in spawn order) is surfaced.
    pub(crate) fn fork_join(&self, units: Vec<(Arc<Environment>, &Node)>) -> EvalResult<()> {
        if units.is_empty() {
            return Ok(());
        }
        let results: Vec<thread::Result<EvalResult<Flow>>> = thread::scope(|scope| {
            let handles: Vec<_> = units
                .iter()
                .map(|(env, node)| scope.spawn(move || self.eval(node, env)))
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });
        let mut first_error = None;
        for result in results {
            match result {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
                Err(_) => {
                    if first_error.is_none() {
                        first_error = Some(EvalError::Internal("parallel worker panicked".into()));
                    }
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
