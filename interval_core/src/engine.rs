//! Timer engine: the state machine that plays an expanded routine.
//!
//! The engine owns a single private state record and is the only thing that
//! mutates it. It does not spawn a timer of its own; the driver calls `tick()`
//! every `tick_interval()` while `is_ticking()` is true.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |          |
//!            +-> Completed (end of sequence, or skip past the last block)
//! any state -> Idle (reset, or skip while Completed)
//! ```
//!
//! Control calls that make no sense in the current state are ignored.
//! Every call that is not ignored publishes a fresh [`IntervalSnapshot`].

use crate::config::Config;
use crate::cue::{CueFlags, CueOutlet, CueRequest, CueScheduler};
use crate::expand::{expand, total_duration_sec};
use crate::snapshot::{project, ProjectionInput};
use crate::ticker::Ticker;
use crate::{ExpandedBlock, IntervalSnapshot, Routine, TimerStatus};
use std::time::{Duration, Instant};

/// Tunables carried from configuration into the engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOptions {
    pub tick_interval: Duration,
    pub countdown_seconds: u32,
    pub audio_enabled: bool,
    pub haptics_enabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.timer.tick_interval_ms),
            countdown_seconds: config.cues.countdown_seconds,
            audio_enabled: config.cues.audio_enabled,
            haptics_enabled: config.cues.haptics_enabled,
        }
    }
}

/// Everything tied to one loaded routine; replaced wholesale on reload
#[derive(Clone, Debug)]
struct EngineState {
    blocks: Vec<ExpandedBlock>,
    status: TimerStatus,
    current_index: usize,
    remaining_sec: f64,
    total_elapsed_sec: f64,
    ticker: Ticker,
    cues: CueScheduler,
}

impl EngineState {
    fn new(blocks: Vec<ExpandedBlock>, options: &EngineOptions) -> Self {
        let mut state = Self {
            blocks,
            status: TimerStatus::Idle,
            current_index: 0,
            remaining_sec: 0.0,
            total_elapsed_sec: 0.0,
            ticker: Ticker::new(options.tick_interval),
            cues: CueScheduler::new(options.countdown_seconds),
        };
        state.rewind();
        state
    }

    fn duration_at(&self, index: usize) -> f64 {
        self.blocks
            .get(index)
            .map_or(0.0, |b| f64::from(b.duration_sec()))
    }

    fn total_duration(&self) -> f64 {
        total_duration_sec(&self.blocks)
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.blocks.len()
    }

    fn project(&self, audio_enabled: bool, haptics_enabled: bool) -> IntervalSnapshot {
        project(&ProjectionInput {
            status: self.status,
            blocks: &self.blocks,
            audio_enabled,
            haptics_enabled,
            current_index: self.current_index,
            remaining_sec: self.remaining_sec,
            total_elapsed_sec: self.total_elapsed_sec,
        })
    }

    /// Back to the first block with clean counters
    fn rewind(&mut self) {
        self.current_index = 0;
        self.remaining_sec = self.duration_at(0);
        self.total_elapsed_sec = 0.0;
        self.cues.clear();
    }
}

/// Plays a routine's expanded sequence against the wall clock
pub struct TimerEngine<O: CueOutlet> {
    routine: Option<Routine>,
    state: EngineState,
    options: EngineOptions,
    audio_enabled: bool,
    haptics_enabled: bool,
    outlet: O,
    snapshot: IntervalSnapshot,
}

impl<O: CueOutlet> TimerEngine<O> {
    /// Create an engine with default options
    pub fn new(routine: Option<Routine>, outlet: O) -> Self {
        Self::with_options(routine, outlet, EngineOptions::default())
    }

    /// Create an engine and push the initial enablement flags to the outlet
    pub fn with_options(routine: Option<Routine>, mut outlet: O, options: EngineOptions) -> Self {
        outlet.submit(CueRequest::EnableAudio(options.audio_enabled));
        outlet.submit(CueRequest::EnableHaptics(options.haptics_enabled));

        let blocks = routine.as_ref().map(expand).unwrap_or_default();
        let state = EngineState::new(blocks, &options);
        let snapshot = state.project(options.audio_enabled, options.haptics_enabled);

        Self {
            routine,
            audio_enabled: options.audio_enabled,
            haptics_enabled: options.haptics_enabled,
            options,
            state,
            outlet,
            snapshot,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The most recently published view
    pub fn snapshot(&self) -> &IntervalSnapshot {
        &self.snapshot
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn routine(&self) -> Option<&Routine> {
        self.routine.as_ref()
    }

    pub fn blocks(&self) -> &[ExpandedBlock] {
        &self.state.blocks
    }

    /// Whether the driver should keep calling `tick()`
    pub fn is_ticking(&self) -> bool {
        self.state.ticker.is_active()
    }

    pub fn tick_interval(&self) -> Duration {
        self.state.ticker.interval()
    }

    pub fn outlet(&self) -> &O {
        &self.outlet
    }

    pub fn outlet_mut(&mut self) -> &mut O {
        &mut self.outlet
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Swap in a different routine (or none), returning to idle
    ///
    /// The expanded sequence and all counters are replaced in one assignment.
    /// Mute and haptics settings are kept.
    pub fn load(&mut self, routine: Option<Routine>) {
        let blocks = routine.as_ref().map(expand).unwrap_or_default();
        tracing::debug!(
            "Loading routine {:?} ({} expanded blocks)",
            routine.as_ref().map(|r| r.name.as_str()),
            blocks.len()
        );

        self.state = EngineState::new(blocks, &self.options);
        self.routine = routine;
        self.publish();
    }

    /// Play from the first block
    ///
    /// Restarts from block 0 when already running or paused. Ignored once
    /// completed; `reset()` first.
    pub fn start(&mut self) {
        if self.state.blocks.is_empty() || self.state.status == TimerStatus::Completed {
            tracing::trace!("Ignoring start in {:?}", self.state.status);
            return;
        }

        self.state.rewind();
        self.state.status = TimerStatus::Running;
        self.state.ticker.start();
        tracing::debug!("Timer started ({} blocks)", self.state.blocks.len());
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.state.status != TimerStatus::Running {
            tracing::trace!("Ignoring pause in {:?}", self.state.status);
            return;
        }

        self.state.ticker.stop();
        self.state.status = TimerStatus::Paused;
        tracing::debug!("Timer paused with {:.1}s remaining", self.state.remaining_sec);
        self.publish();
    }

    pub fn resume(&mut self) {
        if self.state.status != TimerStatus::Paused {
            tracing::trace!("Ignoring resume in {:?}", self.state.status);
            return;
        }

        self.state.ticker.start();
        self.state.status = TimerStatus::Running;
        tracing::debug!("Timer resumed");
        self.publish();
    }

    /// Stop and return to the first block. Valid in any state.
    pub fn reset(&mut self) {
        self.state.ticker.stop();
        self.state.status = TimerStatus::Idle;
        self.state.rewind();
        tracing::debug!("Timer reset");
        self.publish();
    }

    /// Jump to the start of the next block without counting the skipped time
    ///
    /// Skipping the last block completes the routine; skipping while completed
    /// resets. While idle the position moves silently, without a transition cue.
    pub fn skip(&mut self) {
        if self.state.blocks.is_empty() {
            return;
        }
        if self.state.status == TimerStatus::Completed {
            self.reset();
            return;
        }

        if self.state.status != TimerStatus::Idle {
            self.emit_transition();
        }
        if self.state.is_last() {
            self.complete();
        } else {
            self.state.current_index += 1;
            self.state.remaining_sec = self.state.duration_at(self.state.current_index);
            self.state.cues.clear();
            tracing::debug!("Skipped to block {}", self.state.current_index);
        }
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        self.audio_enabled = !self.audio_enabled;
        self.outlet.submit(CueRequest::EnableAudio(self.audio_enabled));
        self.publish();
    }

    pub fn toggle_haptics(&mut self) {
        self.haptics_enabled = !self.haptics_enabled;
        self.outlet.submit(CueRequest::EnableHaptics(self.haptics_enabled));
        self.publish();
    }

    /// Advance the countdown to the current wall-clock time
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advance the countdown to `now`
    ///
    /// Time advance, countdown cues and block advance happen in that order
    /// before the snapshot is published.
    pub fn tick_at(&mut self, now: Instant) {
        if self.state.status != TimerStatus::Running {
            return;
        }
        let Some(delta) = self.state.ticker.delta(now) else {
            return;
        };

        self.state.remaining_sec -= delta;
        self.state.total_elapsed_sec += delta;

        let flags = self.cue_flags();
        let cues = self.state.cues.countdown(self.state.remaining_sec, flags);
        self.emit(cues);

        if self.state.remaining_sec <= 0.0 {
            let overflow = -self.state.remaining_sec;
            self.advance(overflow);
        }

        self.publish();
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Move past exhausted blocks, carrying leftover time into the next one
    ///
    /// A single large delta can exhaust several short blocks; each boundary
    /// crossed fires one transition cue. Overflow past the last block is
    /// dropped.
    fn advance(&mut self, mut overflow_sec: f64) {
        loop {
            self.emit_transition();

            if self.state.is_last() {
                self.complete();
                return;
            }

            self.state.current_index += 1;
            self.state.remaining_sec =
                self.state.duration_at(self.state.current_index) - overflow_sec;
            self.state.cues.clear();
            tracing::debug!(
                "Advanced to block {} ({:.2}s carried over)",
                self.state.current_index,
                overflow_sec
            );

            if self.state.remaining_sec > 0.0 {
                return;
            }
            overflow_sec = -self.state.remaining_sec;
        }
    }

    fn complete(&mut self) {
        self.state.ticker.stop();
        self.state.status = TimerStatus::Completed;
        self.state.remaining_sec = 0.0;
        self.state.total_elapsed_sec = self
            .state
            .total_elapsed_sec
            .min(self.state.total_duration());
        tracing::info!(
            "Routine completed after {:.1}s",
            self.state.total_elapsed_sec
        );
    }

    fn cue_flags(&self) -> CueFlags {
        CueFlags {
            audio: self.audio_enabled,
            haptics: self.haptics_enabled,
        }
    }

    fn emit_transition(&mut self) {
        let cues = CueScheduler::transition(self.cue_flags());
        self.emit(cues);
    }

    fn emit(&mut self, cues: Vec<CueRequest>) {
        for cue in cues {
            self.outlet.submit(cue);
        }
    }

    fn publish(&mut self) {
        self.snapshot = self
            .state
            .project(self.audio_enabled, self.haptics_enabled);
    }
}
