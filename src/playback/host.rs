use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::core::Millis;

/// Time source the animation clock runs against.
///
/// `yield_until` is where a run gives control back to its host between ticks. Implementations
/// must actually wait (or advance virtual time); spinning is never acceptable.
pub trait HostClock {
    /// Current time in milliseconds on this clock's own monotonic axis.
    fn now_ms(&self) -> Millis;

    /// Block until `now_ms() >= due`. Returns immediately when `due` is already past.
    fn yield_until(&self, due: Millis);
}

impl<C: HostClock + ?Sized> HostClock for &C {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }

    fn yield_until(&self, due: Millis) {
        (**self).yield_until(due)
    }
}

/// Wall-clock host: monotonic `Instant` time, thread sleep for waiting.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Clock whose zero is now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn yield_until(&self, due: Millis) {
        // Sleep may round down; re-check and sleep again for the remainder.
        loop {
            let wait = due - self.now_ms();
            if wait.is_nan() || wait <= 0.0 {
                return;
            }
            let Ok(nap) = Duration::try_from_secs_f64((wait / 1000.0).max(1e-6)) else {
                return;
            };
            std::thread::sleep(nap);
        }
    }
}

/// Offline host: time only moves when told to, and waiting jumps straight to the deadline.
///
/// Clones share the same time line, so a test can keep a handle while a session owns another.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    now_bits: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Virtual clock starting at 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta` milliseconds (negative values are ignored).
    pub fn advance(&self, delta: Millis) {
        if delta > 0.0 {
            self.set(self.now_ms() + delta);
        }
    }

    /// Jump to `t`, which may be in the past.
    pub fn set(&self, t: Millis) {
        self.now_bits.store(t.to_bits(), Ordering::SeqCst);
    }
}

impl HostClock for VirtualClock {
    fn now_ms(&self) -> Millis {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }

    fn yield_until(&self, due: Millis) {
        if due > self.now_ms() {
            self.set(due);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/host.rs"]
mod tests;
