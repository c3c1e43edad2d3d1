//! Condition Primitive
//!
//! This module implements a condition for code written in continuation-passing
//! style. Instead of blocking a caller until the condition holds, it stores
//! the caller's continuation and invokes it once the condition is set.
//!
//! # Concepts
//!
//! ## States
//!
//! A condition is either unset (the initial state) or set. `broadcast` moves
//! it to set, `reset` moves it back. Both are idempotent.
//!
//! ## Waiters
//!
//! A waiter is a [`Continuation`]. Waiters registered while the condition is
//! unset are queued and run, in registration order, by the next broadcast.
//! Waiters registered while it is set run right away, or at the end of the
//! current turn when registered asynchronously.
//!
//! ## Reentrancy
//!
//! While a condition is running one of its waiters, the condition is
//! guaranteed to stay set. `broadcast` and `reset` called from inside a
//! waiter fail with [`ConditionError::ReentrancyViolation`](crate::error::ConditionError)
//! and change nothing. Registering from inside a waiter is always allowed.
//!
//! # Implementation Notes
//!
//! All state lives behind an `Rc` with `Cell`/`RefCell` interior mutability.
//! Borrows are never held while user code runs, so a waiter may freely call
//! back into the condition it waits on.

mod continuation;
mod guard;
mod handle;

pub use continuation::{ConditionId, Continuation};
pub use handle::Condition;
