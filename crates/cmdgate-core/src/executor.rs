//! Execution adapter seam
//!
//! The pipeline hands accepted command text to an `ExecutionAdapter` and
//! stores whatever string comes back. Running real commands is outside this
//! crate; the shipped adapters only simulate execution.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ExError, ExErrorKind, GateError};

/// Backend that carries out an admitted command
pub trait ExecutionAdapter: Send + Sync {
    /// Execute `command_text` and return its output
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::ExecutionFailed` (or `Timeout`) when the backend
    /// cannot produce a result. The pipeline then persists nothing.
    #[allow(clippy::result_large_err)]
    fn execute(&self, command_text: &str) -> Result<String, ExError>;
}

/// Echoes what it would have run; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct MockExecutionAdapter;

impl ExecutionAdapter for MockExecutionAdapter {
    fn execute(&self, command_text: &str) -> Result<String, ExError> {
        Ok(format!("[MOCK] Would execute: {}", command_text))
    }
}

/// Always fails (for tests that verify rollback on adapter failure)
#[derive(Debug, Clone, Default)]
pub struct FailingExecutionAdapter {
    pub message: String,
}

impl ExecutionAdapter for FailingExecutionAdapter {
    fn execute(&self, _: &str) -> Result<String, ExError> {
        Err(GateError::ExecutionFailed {
            message: if self.message.is_empty() {
                "execution backend unavailable".to_string()
            } else {
                self.message.clone()
            },
        }
        .into())
    }
}

/// Bounds another adapter's execution time
///
/// The inner call runs on its own thread. If it has not answered within
/// `timeout` the submission fails with `ExErrorKind::Timeout`; the thread is
/// left to finish on its own and its result is discarded.
pub struct TimeoutAdapter {
    inner: Arc<dyn ExecutionAdapter>,
    timeout: Duration,
}

impl TimeoutAdapter {
    pub fn new(inner: Arc<dyn ExecutionAdapter>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl ExecutionAdapter for TimeoutAdapter {
    fn execute(&self, command_text: &str) -> Result<String, ExError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let text = command_text.to_string();

        std::thread::Builder::new()
            .name("cmdgate-exec".to_string())
            .spawn(move || {
                // Receiver may be gone after a timeout; nothing to do then.
                let _ = tx.send(inner.execute(&text));
            })
            .map_err(|e| {
                ExError::new(ExErrorKind::ExecutionFailed)
                    .with_op("execute")
                    .with_message(format!("Failed to spawn execution thread: {}", e))
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(GateError::ExecutionTimeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
            .into()),
            Err(RecvTimeoutError::Disconnected) => Err(GateError::ExecutionFailed {
                message: "execution thread terminated without a result".to_string(),
            }
            .into()),
        }
    }
}

impl std::fmt::Debug for TimeoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutAdapter")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
