//! Terminators for controlling and interrupting long-running searches.
//!
//! This module provides several implementations of the [`Terminator`] trait, including:
//! - [`InterruptTerminator`]: Responds to Ctrl-C (SIGINT) or programmatic interrupts.
//! - [`TimeoutTerminator`]: Terminates after a specified wall-clock budget.
//! - [`MultipleTerminators`]: Combines multiple terminators.
//!
//! # Note
//! [`InterruptTerminator`] installs a global signal handler and **can only be constructed once** per process. Attempting to create multiple instances will result in a panic.

use std::sync::{Arc, atomic::AtomicBool};
use std::time::Duration;

/// Why a terminator fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    TimedOut,
    Interrupted,
}

pub trait Terminator {
    fn initialize(&mut self) {}

    fn terminate(&mut self) -> Option<TerminationReason>;
}

/// Terminator that responds to Ctrl-C (SIGINT) or programmatic interrupts.
///
/// # Note
/// Only one instance of `InterruptTerminator` can be constructed per process, as it installs a global signal handler.
/// Creating more than one will panic.
pub struct InterruptTerminator {
    interrupted: Arc<AtomicBool>,
}

impl InterruptTerminator {
    pub fn new() -> Self {
        let interrupted = Arc::new(AtomicBool::new(false));
        ctrlc::set_handler({
            let interrupted_clone = interrupted.clone();
            move || {
                interrupted_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        })
        .expect("Error setting Ctrl-C handler");
        Self { interrupted }
    }

    pub fn interrupt(&mut self) {
        self.interrupted.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Terminator for InterruptTerminator {
    fn terminate(&mut self) -> Option<TerminationReason> {
        if self.interrupted.load(std::sync::atomic::Ordering::SeqCst) {
            Some(TerminationReason::Interrupted)
        } else {
            None
        }
    }
}

/// Terminator that triggers once a wall-clock budget elapses.
///
/// Unlike a whole-seconds iteration budget, search deadlines are specified
/// in milliseconds (`satisfaction_timeout`/`optimization_timeout`), so this
/// polls a [`Duration`] rather than a second count.
pub struct TimeoutTerminator {
    budget: Duration,
    start_time: std::time::Instant,
}

impl TimeoutTerminator {
    pub fn new(budget: Duration) -> Self {
        Self { budget, start_time: std::time::Instant::now() }
    }
}

impl Terminator for TimeoutTerminator {
    fn initialize(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    fn terminate(&mut self) -> Option<TerminationReason> {
        if self.start_time.elapsed() >= self.budget { Some(TerminationReason::TimedOut) } else { None }
    }
}

/// Terminator that combines multiple terminators and triggers if any of them do.
pub struct MultipleTerminators {
    terminators: Vec<Box<dyn Terminator>>,
}

impl MultipleTerminators {
    pub fn new(terminators: Vec<Box<dyn Terminator>>) -> Self {
        Self { terminators }
    }
}

impl Terminator for MultipleTerminators {
    fn initialize(&mut self) {
        for terminator in &mut self.terminators {
            terminator.initialize();
        }
    }

    fn terminate(&mut self) -> Option<TerminationReason> {
        for terminator in &mut self.terminators {
            if let Some(reason) = terminator.as_mut().terminate() {
                return Some(reason);
            }
        }
        None
    }
}
