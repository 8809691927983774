//! Host-observable output from the interpreted program.
//!
//! `print`, `mock_sensor`, and `@timed` reports all emit whole lines through
//! an [`OutputSink`]. The capture variant lets tests assert on emitted lines
//! without touching process stdout, including lines emitted concurrently from
//! parallel workers. Enum dispatch rather than a trait object: this is the
//! hottest host-facing path.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub enum OutputSink {
    /// Write lines to process stdout.
    #[default]
    Stdout,
    /// Collect lines into a shared buffer for assertions.
    Capture(Arc<Mutex<Vec<String>>>),
}

impl OutputSink {
    /// Create a capturing sink with an empty buffer.
    pub fn capture() -> Self {
        OutputSink::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    /// Emit one line. Lines from concurrent workers may interleave in any
    /// order, but each line lands whole.
    pub fn emit(&self, line: String) {
        match self {
            OutputSink::Stdout => println!("{line}"),
            OutputSink::Capture(buffer) => buffer.lock().push(line),
        }
    }

    /// Snapshot of captured lines. Always empty for the stdout sink.
    pub fn lines(&self) -> Vec<String> {
        match self {
            OutputSink::Stdout => Vec::new(),
            OutputSink::Capture(buffer) => buffer.lock().clone(),
        }
    }
}
