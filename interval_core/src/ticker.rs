//! Wall-clock ticker for the countdown.
//!
//! Time is advanced by the real time between ticks rather than a fixed amount
//! per tick, so a late or missed tick (scheduler jitter, app backgrounded)
//! still lands the countdown where it should be. The first tick after a
//! (re)start only records a reference point.

use std::time::{Duration, Instant};

/// Nominal spacing between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    active: bool,
    last_tick: Option<Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
            last_tick: None,
        }
    }

    /// How often the driver should call the engine's tick
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin ticking; the next tick establishes the reference time
    pub fn start(&mut self) {
        self.active = true;
        self.last_tick = None;
    }

    /// Stop ticking and forget the reference time. Idempotent.
    pub fn stop(&mut self) {
        self.active = false;
        self.last_tick = None;
    }

    /// Seconds since the previous tick
    ///
    /// Returns `None` when inactive, and on the first tick after a start (which
    /// only records `now`). A `now` earlier than the previous tick counts as zero.
    pub fn delta(&mut self, now: Instant) -> Option<f64> {
        if !self.active {
            return None;
        }

        let previous = self.last_tick.replace(now)?;
        Some(now.saturating_duration_since(previous).as_secs_f64())
    }
}
