//! Progress reporting for the ETL stages.
//!
//! Each stage receives a `&dyn ProgressSink` and reports phase transitions
//! through it instead of logging to ambient global state.

use std::sync::Mutex;

/// Destination for phase-transition messages.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, message: &str);
}

/// Forwards progress messages to `tracing` at INFO level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn progress(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Collects progress messages in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn progress(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
