//! Continuation types for the condition primitive.
//!
//! A Continuation is the deferred remainder of a computation that is waiting
//! for a condition. It is opaque: the condition never inspects, compares or
//! orders it beyond registration order, and invokes it exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a condition.
///
/// Used to correlate log events; clones of a [`Condition`](super::Condition)
/// share the same ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionId(u64);

impl ConditionId {
    /// Generate a new unique condition ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cond#{}", self.0)
    }
}

/// A waiter registered on a condition.
///
/// The two variants mirror the two registration forms: a plain callback, and
/// one that is told whether the condition is set when it runs.
pub enum Continuation {
    /// Takes no arguments.
    Plain(Box<dyn FnOnce()>),
    /// Receives the condition's state at invocation.
    Flagged(Box<dyn FnOnce(bool)>),
}

impl Continuation {
    /// Wrap a no-argument callback.
    pub fn plain<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Continuation::Plain(Box::new(f))
    }

    /// Wrap a callback that receives the condition's state.
    pub fn flagged<F>(f: F) -> Self
    where
        F: FnOnce(bool) + 'static,
    {
        Continuation::Flagged(Box::new(f))
    }

    /// Consume and run the continuation.
    pub(crate) fn invoke(self, set: bool) {
        match self {
            Continuation::Plain(f) => f(),
            Continuation::Flagged(f) => f(set),
        }
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Continuation::Plain(_) => f.write_str("Continuation::Plain(..)"),
            Continuation::Flagged(_) => f.write_str("Continuation::Flagged(..)"),
        }
    }
}
