//! Micro-task Queue
//!
//! A per-thread FIFO of deferred work plus a turn counter. A turn is one
//! run-to-completion step of the host: everything queued during the turn runs
//! when the outermost turn ends, before control returns to the host, and no
//! unrelated turn can start in between.
//!
//! # Implementation
//!
//! Like the dependency-tracking context, the queue lives in thread-local
//! storage. Conditions are confined to one thread, so no synchronization is
//! needed. The turn depth is maintained by a guard so that a panicking turn
//! still leaves the counter balanced.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// A unit of deferred work.
pub type Microtask = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
    static TURN_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Static interface to the current thread's micro-task queue.
pub struct Microtasks;

impl Microtasks {
    /// Queue `task` to run at the end of the current turn.
    ///
    /// Outside any turn the task stays queued until the next turn ends or
    /// [`Microtasks::drain`] is called.
    pub fn enqueue<F>(task: F)
    where
        F: FnOnce() + 'static,
    {
        QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));

        if !Self::in_turn() {
            tracing::debug!(
                pending = Self::pending(),
                "microtask queued outside a turn; waiting for drain"
            );
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending() -> usize {
        QUEUE.with(|queue| queue.borrow().len())
    }

    /// Check if a turn is currently executing on this thread.
    pub fn in_turn() -> bool {
        TURN_DEPTH.with(|depth| depth.get() > 0)
    }

    /// Run every queued task, including tasks queued while draining.
    ///
    /// Returns the number of tasks that ran.
    pub fn drain() -> usize {
        let mut ran = 0;

        // The borrow is released before each task runs so tasks can enqueue.
        while let Some(task) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
            task();
            ran += 1;
        }

        if ran > 0 {
            tracing::trace!(ran, "drained microtasks");
        }

        ran
    }

    /// Run `f` as one turn.
    ///
    /// When the outermost turn finishes, the queue is drained before this
    /// function returns. Nested turns leave draining to the outermost one.
    pub fn run_turn<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let turn = TurnGuard::enter();
        let result = f();

        if turn.is_outermost() {
            // Tasks that run while draining still belong to this turn.
            Self::drain();
        }

        result
    }
}

/// Keeps the turn depth balanced, even across panics.
struct TurnGuard {
    depth: usize,
}

impl TurnGuard {
    fn enter() -> Self {
        let depth = TURN_DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });

        Self { depth }
    }

    fn is_outermost(&self) -> bool {
        self.depth == 1
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        TURN_DEPTH.with(|d| {
            debug_assert_eq!(
                d.get(),
                self.depth,
                "TurnGuard mismatch: expected depth {}, got {}",
                self.depth,
                d.get()
            );
            d.set(d.get().saturating_sub(1));
        });
    }
}
