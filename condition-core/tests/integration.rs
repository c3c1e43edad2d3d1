//! Integration Tests for the Condition Primitive
//!
//! These tests drive conditions the way a continuation-passing program does:
//! waiters register, a broadcast resumes them, and deferred deliveries are
//! bounded by a micro-task turn.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use condition_core::{Condition, ConditionError, Continuation, Microtasks, Operation};

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Reset on a fresh condition and a second broadcast are both no-ops.
#[test]
fn reset_and_broadcast_are_idempotent() {
    let cond = Condition::new();
    let runs = Rc::new(Cell::new(0));

    cond.reset().unwrap();
    assert!(!cond.is_set());

    let runs_clone = runs.clone();
    cond.wait(move || runs_clone.set(runs_clone.get() + 1));

    cond.broadcast().unwrap();
    assert!(cond.is_set());
    assert_eq!(runs.get(), 1);

    cond.broadcast().unwrap();
    assert!(cond.is_set());
    assert_eq!(runs.get(), 1);
}

/// Waiters queued while unset run once each, in registration order.
#[test]
fn broadcast_delivers_in_fifo_order() {
    let cond = Condition::new();
    let log = log();

    for name in ["c1", "c2", "c3"] {
        let log = log.clone();
        cond.wait_with(false, move |set| {
            assert!(set);
            log.borrow_mut().push(name.to_string());
        });
    }

    cond.broadcast().unwrap();
    assert_eq!(entries(&log), vec!["c1", "c2", "c3"]);

    cond.broadcast().unwrap();
    assert_eq!(entries(&log).len(), 3);
}

/// A synchronous registration on a set condition runs before it returns.
#[test]
fn synchronous_registration_runs_inline() {
    let cond = Condition::new();
    cond.broadcast().unwrap();

    let seen = Rc::new(Cell::new(None));
    let seen_clone = seen.clone();
    cond.wait_with(false, move |set| seen_clone.set(Some(set)));

    assert_eq!(seen.get(), Some(true));
}

/// An asynchronous registration on a set condition runs after registration
/// returns but before the turn ends.
#[test]
fn asynchronous_registration_runs_at_end_of_turn() {
    let cond = Condition::new();
    cond.broadcast().unwrap();

    let seen = Rc::new(Cell::new(None));

    let seen_clone = seen.clone();
    Microtasks::run_turn(|| {
        cond.wait_with(true, move |set| seen_clone.set(Some(set)));
        assert_eq!(seen.get(), None);
    });

    assert_eq!(seen.get(), Some(true));
    assert_eq!(Microtasks::pending(), 0);
}

/// Broadcast and reset from inside a waiter fail without side effects.
#[test]
fn mutation_from_waiter_is_rejected() {
    let cond = Condition::new();
    let outcomes = Rc::new(RefCell::new(Vec::new()));

    let cond_clone = cond.clone();
    let outcomes_clone = outcomes.clone();
    cond.wait(move || {
        let pending_before = cond_clone.pending_count();
        outcomes_clone.borrow_mut().push(cond_clone.broadcast());
        outcomes_clone.borrow_mut().push(cond_clone.reset());
        assert!(cond_clone.is_set());
        assert_eq!(cond_clone.pending_count(), pending_before);
    });

    let second = Rc::new(Cell::new(false));
    let second_clone = second.clone();
    cond.wait(move || second_clone.set(true));

    cond.broadcast().unwrap();

    assert_eq!(
        *outcomes.borrow(),
        vec![
            Err(ConditionError::ReentrancyViolation {
                operation: Operation::Broadcast
            }),
            Err(ConditionError::ReentrancyViolation {
                operation: Operation::Reset
            }),
        ]
    );
    assert!(second.get());
    assert!(cond.is_set());

    // Outside the waiter the same calls succeed again
    cond.reset().unwrap();
    assert!(!cond.is_set());
}

/// Registering from inside a waiter follows the already-set rules and never
/// joins the batch being drained.
#[test]
fn registration_during_broadcast_uses_set_rules() {
    let cond = Condition::new();
    let log = log();

    let cond_clone = cond.clone();
    let log_clone = log.clone();
    cond.wait(move || {
        log_clone.borrow_mut().push("first".into());

        let inline = log_clone.clone();
        cond_clone.wait_with(false, move |set| {
            assert!(set);
            inline.borrow_mut().push("inline".into());
        });

        let deferred = log_clone.clone();
        cond_clone.wait_with(true, move |set| {
            assert!(set);
            deferred.borrow_mut().push("deferred".into());
        });

        assert_eq!(cond_clone.pending_count(), 0);
    });

    let log_clone = log.clone();
    cond.wait(move || log_clone.borrow_mut().push("second".into()));

    Microtasks::run_turn(|| {
        cond.broadcast().unwrap();
        assert_eq!(entries(&log), vec!["first", "inline", "second"]);
    });

    assert_eq!(entries(&log), vec!["first", "inline", "second", "deferred"]);
}

/// After a reset, registrations queue again until the next broadcast.
#[test]
fn reset_condition_can_be_reused() {
    let cond = Condition::new();
    cond.broadcast().unwrap();
    cond.reset().unwrap();

    let ran = Rc::new(Cell::new(false));
    let ran_clone = ran.clone();
    cond.wait(move || ran_clone.set(true));

    assert!(!ran.get());
    assert_eq!(cond.pending_count(), 1);

    cond.broadcast().unwrap();
    assert!(ran.get());
}

/// The walkthrough: two waiters, broadcast, reset, then a synchronous
/// registration on the unset condition that has to wait for the next set.
#[test]
fn set_reset_set_scenario() {
    let cond = Condition::new();
    let log = log();

    for name in ["f1", "f2"] {
        let log = log.clone();
        cond.register(
            Continuation::flagged(move |set| log.borrow_mut().push(format!("{name}:{set}"))),
            false,
        );
    }

    cond.broadcast().unwrap();
    assert_eq!(entries(&log), vec!["f1:true", "f2:true"]);
    assert!(cond.is_set());

    cond.reset().unwrap();
    assert!(!cond.is_set());
    assert_eq!(entries(&log).len(), 2);

    let log_clone = log.clone();
    cond.wait_with(false, move |set| log_clone.borrow_mut().push(format!("f3:{set}")));
    assert_eq!(entries(&log).len(), 2);

    cond.broadcast().unwrap();
    assert_eq!(entries(&log), vec!["f1:true", "f2:true", "f3:true"]);
}

/// Independent conditions keep independent reentrancy flags: a waiter on one
/// may drive another.
#[test]
fn waiter_can_broadcast_other_condition() {
    let first = Condition::new();
    let second = Condition::new();
    let log = log();

    let log_clone = log.clone();
    second.wait(move || log_clone.borrow_mut().push("second".into()));

    let second_clone = second.clone();
    let log_clone = log.clone();
    first.wait(move || {
        log_clone.borrow_mut().push("first".into());
        second_clone.broadcast().unwrap();
    });

    first.broadcast().unwrap();

    assert_eq!(entries(&log), vec!["first", "second"]);
    assert!(second.is_set());
}

/// Without a turn to defer to, asynchronous waiters on a set condition are
/// delivered before registration returns, so none can be stranded.
#[test]
fn asynchronous_waiters_outside_turn_are_not_lost() {
    let cond = Condition::new();
    cond.broadcast().unwrap();

    let ran = Rc::new(Cell::new(0));
    for _ in 0..3 {
        let ran = ran.clone();
        cond.wait_with(true, move |_| ran.set(ran.get() + 1));
    }

    assert_eq!(ran.get(), 3);
    assert_eq!(Microtasks::pending(), 0);
    assert_eq!(Microtasks::drain(), 0);
}

/// The plain form on a set condition runs before it returns.
#[test]
fn plain_registration_on_set_condition_runs_inline() {
    let cond = Condition::new();
    cond.broadcast().unwrap();

    let ran = Rc::new(Cell::new(false));
    let ran_clone = ran.clone();
    cond.wait(move || ran_clone.set(true));

    assert!(ran.get());
    assert_eq!(cond.pending_count(), 0);

    // Same inside a turn: the plain form never defers
    let in_turn = Rc::new(Cell::new(false));
    Microtasks::run_turn(|| {
        let in_turn_clone = in_turn.clone();
        cond.wait(move || in_turn_clone.set(true));
        assert!(in_turn.get());
    });
}
