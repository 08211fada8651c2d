use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    foundation::core::Millis,
    foundation::error::{MotiongramError, MotiongramResult},
};

/// `active` value meaning "no run".
const IDLE: u64 = 0;

/// Identifier of one animation run. Every `start` mints a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    /// Raw id value (never 0).
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Permission to execute one tick of a specific run, no earlier than `due_ms`.
///
/// Tickets of a cancelled run are stale: presenting one executes nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickTicket {
    run: RunId,
    due_ms: Millis,
}

impl TickTicket {
    /// Run this ticket belongs to.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// Host time at which the tick may execute.
    pub fn due_ms(&self) -> Millis {
        self.due_ms
    }
}

/// Observable clock state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockState {
    /// No run in progress.
    Idle,
    /// A run is in progress.
    Running {
        /// Active run.
        run: RunId,
        /// Host time the run started at.
        started_at: Millis,
    },
}

/// Cancels the current run from anywhere, including another thread.
#[derive(Clone, Debug)]
pub struct StopHandle {
    active: Arc<AtomicU64>,
}

impl StopHandle {
    /// Stop whatever run is active. Outstanding tickets become stale.
    pub fn stop(&self) {
        let prev = self.active.swap(IDLE, Ordering::SeqCst);
        if prev != IDLE {
            tracing::debug!(run = prev, "run stopped via handle");
        }
    }

    /// Whether any run is active.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst) != IDLE
    }
}

/// Run bookkeeping: which run is live, when it started, and when the next tick is due.
///
/// The clock never reads time itself; callers pass host time in, which keeps it usable with both
/// wall-clock and virtual hosts.
#[derive(Debug)]
pub struct AnimationClock {
    active: Arc<AtomicU64>,
    last_run: u64,
    started_at: Millis,
    duration_ms: Millis,
    tick_interval_ms: Millis,
}

impl AnimationClock {
    /// Default run length.
    pub const DEFAULT_DURATION_MS: Millis = 10_000.0;
    /// Default spacing between ticks.
    pub const DEFAULT_TICK_INTERVAL_MS: Millis = 20.0;

    /// Idle clock. `duration_ms` must be finite and >= 0, `tick_interval_ms` finite and > 0.
    pub fn new(duration_ms: Millis, tick_interval_ms: Millis) -> MotiongramResult<Self> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(MotiongramError::validation(
                "animation duration must be finite and >= 0",
            ));
        }
        if !tick_interval_ms.is_finite() || tick_interval_ms <= 0.0 {
            return Err(MotiongramError::validation(
                "tick interval must be finite and > 0",
            ));
        }
        Ok(Self {
            active: Arc::new(AtomicU64::new(IDLE)),
            last_run: IDLE,
            started_at: 0.0,
            duration_ms,
            tick_interval_ms,
        })
    }

    /// Run length in milliseconds.
    pub fn duration_ms(&self) -> Millis {
        self.duration_ms
    }

    /// Tick spacing in milliseconds.
    pub fn tick_interval_ms(&self) -> Millis {
        self.tick_interval_ms
    }

    /// Cancel any run in progress and begin a new one at host time `now`.
    ///
    /// The returned ticket is due immediately.
    pub fn start(&mut self, now: Millis) -> TickTicket {
        self.last_run += 1;
        let run = RunId(self.last_run);
        self.started_at = now;
        let prev = self.active.swap(run.0, Ordering::SeqCst);
        if prev != IDLE {
            tracing::debug!(cancelled = prev, run = run.0, "restart cancels the active run");
        }
        TickTicket { run, due_ms: now }
    }

    /// Cancel the run in progress, if any.
    pub fn stop(&mut self) {
        self.active.store(IDLE, Ordering::SeqCst);
    }

    /// Handle that can stop this clock's runs from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            active: Arc::clone(&self.active),
        }
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        match self.active.load(Ordering::SeqCst) {
            IDLE => ClockState::Idle,
            id => ClockState::Running {
                run: RunId(id),
                started_at: self.started_at,
            },
        }
    }

    /// Whether `ticket` belongs to the live run.
    pub fn is_current(&self, ticket: &TickTicket) -> bool {
        self.active.load(Ordering::SeqCst) == ticket.run.0
    }

    /// Milliseconds since the live run started, at host time `now`.
    pub fn elapsed(&self, now: Millis) -> Millis {
        now - self.started_at
    }

    /// Book-keep a tick executed at host time `now`.
    ///
    /// Returns the next ticket while the run has time left; otherwise the clock goes idle. A stale
    /// ticket never schedules anything.
    pub fn advance(&mut self, ticket: &TickTicket, now: Millis) -> Option<TickTicket> {
        if !self.is_current(ticket) {
            return None;
        }
        if self.elapsed(now) < self.duration_ms {
            return Some(TickTicket {
                run: ticket.run,
                due_ms: now + self.tick_interval_ms,
            });
        }
        // Only idle out if nobody restarted in between.
        let _ = self.active.compare_exchange(
            ticket.run.0,
            IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        None
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            active: Arc::new(AtomicU64::new(IDLE)),
            last_run: IDLE,
            started_at: 0.0,
            duration_ms: Self::DEFAULT_DURATION_MS,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
