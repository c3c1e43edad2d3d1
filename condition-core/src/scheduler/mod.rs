//! Deferred Execution
//!
//! This module provides the run-to-completion "turn" that deferred
//! continuations are scheduled against.
//!
//! # Overview
//!
//! A condition that is already set can deliver a new waiter in two ways:
//!
//! - Inline: the continuation runs before the registering call returns.
//! - Deferred: the continuation is handed to the micro-task queue. It runs
//!   no earlier than the return of the registering call and no later than
//!   the end of the current turn. With no turn active there is nothing to
//!   defer to, and the condition falls back to inline delivery.
//!
//! The queue is per-thread. The host (an event loop, a test, a cooperative
//! task runner) marks its run-to-completion steps with
//! [`Microtasks::run_turn`], or drains explicitly with [`Microtasks::drain`].

mod microtask;

pub use microtask::{Microtask, Microtasks};
