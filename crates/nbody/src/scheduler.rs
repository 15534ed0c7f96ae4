//! Cooperative tick scheduling
//!
//! The engine runs one tick at a time and hands control to a [`Scheduler`]
//! between ticks. The scheduler decides how long to wait before the next tick;
//! it never runs concurrently with a tick. Stopping is cooperative: a
//! [`StopHandle`] clears a shared flag that the engine checks after each tick.

use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Capability to resume the engine after a minimal delay
pub trait Scheduler {
    /// Called between ticks while the engine is running. Returns when the host
    /// is ready for the next tick.
    fn defer(&mut self);
}

/// Any `FnMut()` works as a scheduler, which keeps tests free of wall-clock waits
impl<F: FnMut()> Scheduler for F {
    fn defer(&mut self) {
        self()
    }
}

/// Yields the thread and resumes immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn defer(&mut self) {
        thread::yield_now();
    }
}

/// Sleeps so that ticks start no more often than once per `period`
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    period: Duration,
    last: Option<Instant>,
}

impl FixedRateScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Scheduler targeting `ticks_per_second`
    pub fn per_second(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / ticks_per_second.max(1))
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Scheduler for FixedRateScheduler {
    fn defer(&mut self) {
        if let Some(last) = self.last {
            if let Some(remaining) = self.period.checked_sub(last.elapsed()) {
                thread::sleep(remaining);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Shared running flag of one engine
///
/// Clones observe and control the same engine. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    running: Rc<Cell<bool>>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Requests that no further tick be started. The in-flight tick still completes.
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub(crate) fn start(&self) {
        self.running.set(true);
    }
}
