//! The fixed native-function table: `print`, `wait`, `mock_sensor`.
//!
//! Primitives are a closed enum rather than boxed host callbacks, so the
//! dispatcher knows the exact callable set at compile time. Arity is fixed
//! per primitive and hard-fails on mismatch; optional arguments are part of
//! the declared arity range, not a coercion.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::output::OutputSink;
use crate::value::Value;
use rand::Rng;
use std::thread;
use std::time::Duration;

/// A host-provided primitive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFn {
    /// `print(...)` — variadic; emits one line per call.
    Print,
    /// `wait(seconds)` — blocks the calling worker for the duration.
    Wait,
    /// `mock_sensor(name?, delay?)` — blocks for `delay`, emits a reading
    /// line, returns the pseudo-random reading.
    MockSensor,
}

impl NativeFn {
    pub fn name(&self) -> &'static str {
        match self {
            NativeFn::Print => "print",
            NativeFn::Wait => "wait",
            NativeFn::MockSensor => "mock_sensor",
        }
    }

    /// Accepted argument counts as `(min, max)`; `None` means unbounded.
    fn arity(&self) -> (usize, Option<usize>) {
        match self {
            NativeFn::Print => (0, None),
            NativeFn::Wait => (1, Some(1)),
            NativeFn::MockSensor => (0, Some(2)),
        }
    }

    /// Invoke the primitive with already-evaluated arguments.
    pub(crate) fn call(&self, args: Vec<Value>, output: &OutputSink) -> EvalResult<Value> {
        self.check_arity(args.len())?;
        match self {
            NativeFn::Print => {
                let line = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                output.emit(line);
                Ok(Value::Unit)
            }
            NativeFn::Wait => {
                let seconds = expect_number(&args[0], "wait")?;
                sleep_for(seconds, "wait")?;
                Ok(Value::Unit)
            }
            NativeFn::MockSensor => {
                let name = match args.first() {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => {
                        return Err(EvalError::TypeMismatch(format!(
                            "mock_sensor name must be a string, got {}",
                            other.type_name()
                        )));
                    }
                    None => "unknown".to_string(),
                };
                let delay = match args.get(1) {
                    Some(value) => expect_number(value, "mock_sensor")?,
                    None => 1.0,
                };
                sleep_for(delay, "mock_sensor")?;
                let reading = (rand::thread_rng().gen_range(0.0..100.0_f64) * 100.0).round() / 100.0;
                let value = Value::Number(reading);
                output.emit(format!("[{name}] sensor reading: {value}"));
                Ok(value)
            }
        }
    }

    fn check_arity(&self, got: usize) -> EvalResult<()> {
        let (min, max) = self.arity();
        if got < min || max.is_some_and(|max| got > max) {
            let expected = match max {
                Some(max) if max == min => format!("{min}"),
                Some(max) => format!("{min} to {max}"),
                None => format!("at least {min}"),
            };
            return Err(EvalError::ArityMismatch(format!(
                "{} takes {expected} argument(s), got {got}",
                self.name()
            )));
        }
        Ok(())
    }
}

fn expect_number(value: &Value, who: &str) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeMismatch(format!(
            "{who} requires a number, got {}",
            other.type_name()
        ))),
    }
}

fn sleep_for(seconds: f64, who: &str) -> EvalResult<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(EvalError::TypeMismatch(format!(
            "{who} requires a finite non-negative duration, got {seconds}"
        )));
    }
    thread::sleep(Duration::from_secs_f64(seconds));
    Ok(())
}

/// Register the native table into the global scope.
pub(crate) fn install(globals: &Environment) {
    for native in [NativeFn::Print, NativeFn::Wait, NativeFn::MockSensor] {
        globals.set(native.name(), Value::Native(native));
    }
}
