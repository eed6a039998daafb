//! Benchmark Errors

use thiserror::Error;

/// Errors raised while benchmarking a test case
#[derive(Debug, Error)]
pub enum BenchError {
    /// The dotted target could not be resolved in the test's scope.
    /// Nothing has been installed when this is returned.
    #[error("cannot resolve benchmark target '{target}': {reason}")]
    Resolution { target: String, reason: String },

    /// The test body (or the measured callable) failed during an iteration.
    /// Iteration `0` is the teardown that runs before the first iteration.
    #[error("iteration {iteration} failed: {source}")]
    Iteration {
        iteration: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The original callable could not be written back
    #[error("cannot restore benchmark target '{target}': {reason}")]
    Restoration { target: String, reason: String },

    /// A previous restoration failure stopped the session
    #[error("benchmark session aborted after a failed restoration")]
    SessionAborted,

    /// Iterations were requested while no benchmark was armed
    #[error("no benchmark is armed")]
    NotArmed,

    /// Benchmark parameters are unusable
    #[error("invalid benchmark: {0}")]
    InvalidSpec(String),
}

impl BenchError {
    /// Whether the rest of the session must stop
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BenchError::Restoration { .. } | BenchError::SessionAborted
        )
    }
}
