//! Wall-clock pacing for the simulation task.
//!
//! The run loop never sleeps directly: it pauses through a [`Ticker`] and
//! checks a [`CancelToken`] at every suspension point, so tests can run a
//! whole trip instantly and `reset` can interrupt a live run within one
//! step interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Pacing source for the per-step delays of the animation loop.
pub trait Ticker: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Real-time pacing via `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepTicker;

impl Ticker for SleepTicker {
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Zero-delay pacing for tests and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantTicker;

impl Ticker for InstantTicker {
    fn pause(&self, _duration: Duration) {}
}

/// Shared cancellation flag between a simulation worker and its owner.
///
/// Cloning shares the flag; once cancelled it stays cancelled for the run
/// it belongs to.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
