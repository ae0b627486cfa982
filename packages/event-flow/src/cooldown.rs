//! Resend cooldown timer.
//!
//! One spawned tick task decrements the remaining seconds once per second
//! and exits at zero. `start` replaces any running task and `stop` aborts
//! it, so tearing down a screen never leaks a tick source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Countdown gating the resend action. Must be driven from inside a tokio
/// runtime; `start` spawns the tick task onto the current one.
#[derive(Debug, Default)]
pub struct Cooldown {
    remaining: Arc<AtomicU64>,
    tick: Option<JoinHandle<()>>,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `secs` seconds, replacing any running tick task.
    pub fn start(&mut self, secs: u64) {
        self.stop();
        self.remaining.store(secs, Ordering::SeqCst);
        if secs == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        self.tick = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of an interval completes immediately; consume
            // it so the count holds its full value for one whole second.
            interval.tick().await;
            loop {
                interval.tick().await;
                // Only this task writes while it is running, so a plain
                // load/store pair is enough.
                let left = remaining.load(Ordering::SeqCst);
                if left == 0 {
                    break;
                }
                remaining.store(left - 1, Ordering::SeqCst);
                if left - 1 == 0 {
                    break;
                }
            }
        }));
    }

    /// Remaining seconds; zero means resend is permitted.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// Cancel the tick task and clear the count.
    pub fn stop(&mut self) {
        if let Some(task) = self.tick.take() {
            task.abort();
        }
        self.remaining.store(0, Ordering::SeqCst);
    }
}

impl Drop for Cooldown {
    fn drop(&mut self) {
        if let Some(task) = self.tick.take() {
            task.abort();
        }
    }
}
