//! Error types.
//!
//! A condition has exactly one runtime failure: mutating it from inside one
//! of its own continuations. Configuration loading has its own error type so
//! that the hot path never carries a `serde_json` payload.

use std::fmt;

use thiserror::Error;

/// A state-mutating operation on a [`Condition`](crate::condition::Condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Setting the condition and draining its waiters.
    Broadcast,
    /// Clearing the condition for reuse.
    Reset,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Broadcast => f.write_str("broadcast"),
            Operation::Reset => f.write_str("reset"),
        }
    }
}

/// Error returned by [`Condition::broadcast`](crate::condition::Condition::broadcast)
/// and [`Condition::reset`](crate::condition::Condition::reset).
///
/// This is a programming error. The operation is aborted and the condition
/// is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The condition was mutated while one of its continuations was running.
    #[error("cannot {operation} a condition from within one of its waiting continuations")]
    ReentrancyViolation {
        /// The operation that was rejected.
        operation: Operation,
    },
}

impl ConditionError {
    /// The operation that was rejected.
    pub fn operation(&self) -> Operation {
        match self {
            ConditionError::ReentrancyViolation { operation } => *operation,
        }
    }
}

/// Error returned when a [`ConditionConfig`](crate::config::ConditionConfig)
/// cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not a valid configuration document.
    #[error("invalid condition config: {0}")]
    Parse(#[from] serde_json::Error),
}
