//! Reentrancy guard.
//!
//! While a condition is invoking one of its continuations, its `in_callback`
//! flag is raised and `broadcast`/`reset` are refused. The flag is a plain
//! boolean. Each guard remembers the value it found and puts it back, so an
//! inner invocation (a waiter registered on an already-set condition from
//! inside another waiter) does not lower the flag for the outer one.

use std::cell::Cell;

/// Raises a condition's `in_callback` flag for as long as it lives.
///
/// Dropping the guard restores the previous value, including during unwinding
/// out of a panicking continuation.
pub(crate) struct CallbackGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> CallbackGuard<'a> {
    pub(crate) fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for CallbackGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!("continuation panicked; lowering reentrancy flag");
        }
        self.flag.set(self.previous);
    }
}
