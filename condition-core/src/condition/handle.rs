//! Condition Implementation
//!
//! A Condition is a boolean flag plus a FIFO of continuations waiting for it
//! to become true.
//!
//! # How Conditions Work
//!
//! 1. While unset, every registration is appended to the pending queue.
//!
//! 2. `broadcast` sets the flag and drains the queue in registration order,
//!    with the reentrancy flag raised for the whole batch.
//!
//! 3. While set, registrations are delivered right away: inline, or on the
//!    micro-task queue when the caller asked for asynchronous delivery.
//!
//! 4. `reset` clears the flag so the condition can be reused.
//!
//! # Confinement
//!
//! The handle shares its state through `Rc`, so it is neither `Send` nor
//! `Sync`. Handing a condition to another thread is a compile error rather
//! than a silent race:
//!
//! ```compile_fail
//! fn assert_send<T: Send>() {}
//! assert_send::<condition_core::condition::Condition>();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;

use smallvec::SmallVec;

use super::continuation::{ConditionId, Continuation};
use super::guard::CallbackGuard;
use crate::config::{ConditionConfig, DeferralPolicy};
use crate::error::{ConditionError, Operation};
use crate::scheduler::Microtasks;

/// Waiters stored inline before the queue spills to the heap.
const INLINE_WAITERS: usize = 4;

type PendingQueue = SmallVec<[Continuation; INLINE_WAITERS]>;

struct Inner {
    id: ConditionId,
    config: ConditionConfig,

    /// `true` once broadcast, until reset.
    state: Cell<bool>,

    /// Raised while this condition is invoking one of its continuations.
    in_callback: Cell<bool>,

    /// Only non-empty while `state` is false.
    pending: RefCell<PendingQueue>,
}

/// A callback-based condition for continuation-passing code.
///
/// Cloning yields another handle to the same condition, which is how a
/// continuation refers back to the condition it waits on.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use condition_core::condition::Condition;
///
/// let ready = Condition::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let log_clone = log.clone();
/// ready.wait(move || log_clone.borrow_mut().push("first"));
/// let log_clone = log.clone();
/// ready.wait_with(false, move |set| {
///     assert!(set);
///     log_clone.borrow_mut().push("second");
/// });
/// assert!(log.borrow().is_empty());
///
/// ready.broadcast().unwrap();
/// assert_eq!(*log.borrow(), vec!["first", "second"]);
/// assert!(ready.is_set());
/// ```
#[derive(Clone)]
pub struct Condition {
    inner: Rc<Inner>,
}

impl Condition {
    /// Create a new, unset condition with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ConditionConfig::default())
    }

    /// Create a new, unset condition.
    pub fn with_config(config: ConditionConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: ConditionId::new(),
                config,
                state: Cell::new(false),
                in_callback: Cell::new(false),
                pending: RefCell::new(SmallVec::new()),
            }),
        }
    }

    /// Get the condition's unique ID.
    pub fn id(&self) -> ConditionId {
        self.inner.id
    }

    /// Get the configuration this condition was created with.
    pub fn config(&self) -> &ConditionConfig {
        &self.inner.config
    }

    /// Check whether the condition is set.
    ///
    /// Has no side effects and is safe to call from inside a continuation.
    pub fn is_set(&self) -> bool {
        self.inner.state.get()
    }

    /// Check whether one of this condition's continuations is running.
    pub fn in_callback(&self) -> bool {
        self.inner.in_callback.get()
    }

    /// Number of continuations waiting for the next broadcast.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Run `f` once the condition is set.
    ///
    /// If the condition is already set, `f` runs before this call returns.
    pub fn wait<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.register(Continuation::plain(f), false);
    }

    /// Run `f(true)` once the condition is set.
    ///
    /// `asynchronous` only matters when the condition is already set: `false`
    /// runs `f` before this call returns, `true` defers it to the end of the
    /// current turn according to the configured [`DeferralPolicy`]. Outside
    /// any [`Microtasks::run_turn`] there is no turn to defer to, and `f` runs
    /// before this call returns.
    pub fn wait_with<F>(&self, asynchronous: bool, f: F)
    where
        F: FnOnce(bool) + 'static,
    {
        self.register(Continuation::flagged(f), asynchronous);
    }

    /// Register a continuation.
    ///
    /// Never fails, and may be called from inside a running continuation.
    /// While the condition is unset the continuation is queued for the next
    /// broadcast regardless of `asynchronous`.
    pub fn register(&self, continuation: Continuation, asynchronous: bool) {
        if !self.is_set() {
            let mut pending = self.inner.pending.borrow_mut();
            pending.push(continuation);
            tracing::trace!(
                condition = %self.inner.id,
                label = ?self.label(),
                pending = pending.len(),
                "continuation queued"
            );
            return;
        }

        if asynchronous && self.inner.config.deferral == DeferralPolicy::Microtask {
            if Microtasks::in_turn() {
                tracing::trace!(condition = %self.inner.id, label = ?self.label(), "continuation deferred");
                let condition = self.clone();
                Microtasks::enqueue(move || condition.deliver_deferred(continuation));
                return;
            }

            tracing::warn!(
                condition = %self.inner.id,
                label = ?self.label(),
                "asynchronous registration outside a turn; delivering inline"
            );
        }

        self.invoke(continuation);
    }

    /// Set the condition and run every pending continuation in registration
    /// order.
    ///
    /// Continuations registered while the batch runs see the condition as
    /// set and are delivered on their own, never as part of this batch.
    /// Broadcasting an already-set condition does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::ReentrancyViolation`] if called from inside
    /// one of this condition's continuations. Nothing is changed in that case.
    ///
    /// # Panics
    ///
    /// A panic in a continuation propagates out of this call. The condition
    /// stays set, and the continuations after it in the batch are dropped
    /// without running.
    pub fn broadcast(&self) -> Result<(), ConditionError> {
        self.check_reentrancy(Operation::Broadcast)?;

        if self.inner.state.replace(true) {
            tracing::trace!(condition = %self.inner.id, label = ?self.label(), "already set");
            return Ok(());
        }

        let batch: PendingQueue = mem::take(&mut *self.inner.pending.borrow_mut());
        tracing::debug!(
            condition = %self.inner.id,
            label = ?self.label(),
            waiters = batch.len(),
            "condition set"
        );

        let _guard = CallbackGuard::enter(&self.inner.in_callback);
        for continuation in batch {
            continuation.invoke(true);
        }

        Ok(())
    }

    /// Clear the condition so it can be reused.
    ///
    /// Resetting an unset condition does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::ReentrancyViolation`] if called from inside
    /// one of this condition's continuations.
    pub fn reset(&self) -> Result<(), ConditionError> {
        self.check_reentrancy(Operation::Reset)?;

        if self.inner.state.replace(false) {
            debug_assert_eq!(self.pending_count(), 0, "set condition had pending waiters");
            tracing::debug!(condition = %self.inner.id, label = ?self.label(), "condition reset");
        }

        Ok(())
    }

    fn check_reentrancy(&self, operation: Operation) -> Result<(), ConditionError> {
        if self.in_callback() {
            tracing::warn!(
                condition = %self.inner.id,
                label = ?self.label(),
                %operation,
                "rejected mutation from inside a continuation"
            );
            return Err(ConditionError::ReentrancyViolation { operation });
        }
        Ok(())
    }

    fn invoke(&self, continuation: Continuation) {
        let _guard = CallbackGuard::enter(&self.inner.in_callback);
        continuation.invoke(true);
    }

    /// Runs on the micro-task queue. A reset between registration and the
    /// tick sends the continuation back to wait for the next broadcast, at
    /// the back of the queue: it runs after waiters registered since the
    /// reset.
    fn deliver_deferred(&self, continuation: Continuation) {
        if self.is_set() {
            self.invoke(continuation);
        } else {
            tracing::trace!(
                condition = %self.inner.id,
                label = ?self.label(),
                "reset before deferred delivery; requeued"
            );
            self.inner.pending.borrow_mut().push(continuation);
        }
    }

    fn label(&self) -> Option<&str> {
        self.inner.config.label.as_deref()
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("id", &self.inner.id)
            .field("label", &self.label())
            .field("set", &self.is_set())
            .field("in_callback", &self.in_callback())
            .field("pending", &self.pending_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
