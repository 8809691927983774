//! The step-barrier actor engine behind `taskunit` and `parallelTasks`.
//!
//! A [`TaskUnitDef`] is an immutable method table created when its definition
//! statement is evaluated. `parallelTasks(A, B, ...)` instantiates one
//! [`TaskUnitInstance`] per argument and wraps them in a [`TaskGroup`]. Host
//! code (or the program itself) then drives the group with `.next()`: each
//! call fans out the current `step<k>` methods, joins them all, and advances
//! every instance counter exactly once.

use crate::env::Environment;
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use dice_types::{Method, Node};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// An immutable `taskunit` definition: a name plus its step method bodies.
#[derive(Debug)]
pub struct TaskUnitDef {
    name: String,
    methods: HashMap<String, Node>,
}

impl TaskUnitDef {
    pub fn new(name: impl Into<String>, methods: &[Method]) -> Self {
        Self {
            name: name.into(),
            methods: methods
                .iter()
                .map(|m| (m.name.clone(), m.body.clone()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn method(&self, name: &str) -> Option<&Node> {
        self.methods.get(name)
    }
}

/// One actor in a group: its definition plus a step counter.
///
/// The counter starts at 1 (the first callable method is `step1`). Each
/// instance tracks its own counter so that a missing step method on one
/// instance cannot desynchronize the others; only the owning group advances
/// it, strictly after the step's join, on the caller's own thread.
#[derive(Debug)]
pub struct TaskUnitInstance {
    def: Arc<TaskUnitDef>,
    current_step: AtomicU32,
}

impl TaskUnitInstance {
    fn new(def: Arc<TaskUnitDef>) -> Self {
        Self {
            def,
            current_step: AtomicU32::new(1),
        }
    }

    /// The method body this instance would run right now, if it has one.
    fn current_method(&self) -> Option<&Node> {
        let step = self.current_step.load(Ordering::Acquire);
        self.def.method(&format!("step{step}"))
    }

    fn advance(&self) {
        self.current_step.fetch_add(1, Ordering::Release);
    }
}

/// An ordered group of task-unit instances stepped together by `.next()`.
///
/// The group never resizes after creation and has no terminal state: calling
/// `.next()` past the last real step is a no-op apart from advancing the
/// counters. Callers decide how many times to step.
#[derive(Debug)]
pub struct TaskGroup {
    instances: Vec<TaskUnitInstance>,
}

impl TaskGroup {
    pub fn new(defs: Vec<Arc<TaskUnitDef>>) -> Self {
        Self {
            instances: defs.into_iter().map(TaskUnitInstance::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Run one barrier step.
    ///
    /// Fans out the current step method for every instance that has one, each
    /// in a fresh child of `env`, joins them all, then advances every counter
    /// once. Instances lacking the method are skipped without error; a step
    /// nobody implements still advances the counters.
    pub fn next(&self, evaluator: &Evaluator, env: &Arc<Environment>) -> EvalResult<()> {
        let units: Vec<(Arc<Environment>, &Node)> = self
            .instances
            .iter()
            .filter_map(|instance| {
                instance
                    .current_method()
                    .map(|body| (Environment::child(env), body))
            })
            .collect();
        if units.is_empty() {
            tracing::debug!("taskgroup step has no step methods, advancing only");
        } else {
            tracing::debug!(workers = units.len(), "taskgroup barrier step");
        }
        let outcome = evaluator.fork_join(units);
        for instance in &self.instances {
            instance.advance();
        }
        outcome
    }
}
