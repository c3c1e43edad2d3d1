//! Condition Core
//!
//! This crate provides a single-threaded, callback-based condition primitive
//! for code written in continuation-passing style. Any number of deferred
//! computations can wait for an event; when the event occurs they are
//! invoked, not unblocked.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `condition`: the [`Condition`] handle, its waiter queue and reentrancy rule
//! - `scheduler`: the per-thread micro-task queue used for deferred delivery
//! - `config`: per-condition settings
//! - `error`: error types
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use condition_core::{Condition, Microtasks};
//!
//! let loaded = Condition::new();
//! let hits = Rc::new(Cell::new(0));
//!
//! let hits_clone = hits.clone();
//! loaded.wait(move || hits_clone.set(hits_clone.get() + 1));
//! loaded.broadcast().unwrap();
//! assert_eq!(hits.get(), 1);
//!
//! // Already set: an asynchronous waiter runs at the end of the turn
//! Microtasks::run_turn(|| {
//!     let hits_clone = hits.clone();
//!     loaded.wait_with(true, move |_| hits_clone.set(hits_clone.get() + 1));
//!     assert_eq!(hits.get(), 1);
//! });
//! assert_eq!(hits.get(), 2);
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod scheduler;

pub use condition::{Condition, ConditionId, Continuation};
pub use config::{ConditionConfig, DeferralPolicy};
pub use error::{ConditionError, ConfigError, Operation};
pub use scheduler::Microtasks;
