//! Audio/haptic cues and the fire-and-forget path to their players.
//!
//! The engine decides *which* cue to fire through [`CueScheduler`] and hands
//! the resulting [`CueRequest`]s to a [`CueOutlet`]. Outlets never report
//! failure back to the engine; collaborator errors are logged and dropped.

use crate::error::CueError;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

/// Default number of final seconds in a block that get a countdown cue
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 3;

/// Sounds the engine can ask for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CueKey {
    CountdownShort,
    CountdownLong,
    Transition,
}

/// Vibration patterns the engine can ask for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PulseKind {
    Success,
    Warning,
    Light,
}

/// A single instruction for the cue collaborators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueRequest {
    Play(CueKey),
    Pulse(PulseKind),
    EnableAudio(bool),
    EnableHaptics(bool),
    UnloadAll,
}

/// Sound player implemented outside the engine
pub trait AudioCues: Send + 'static {
    fn enable(&mut self, enabled: bool);
    fn play(&mut self, cue: CueKey) -> Result<(), CueError>;
    fn unload_all(&mut self);
}

/// Vibration driver implemented outside the engine
pub trait Haptics: Send + 'static {
    fn enable(&mut self, enabled: bool);
    fn pulse(&mut self, kind: PulseKind) -> Result<(), CueError>;
}

/// Where the engine sends cue requests
///
/// `submit` must not block on playback and cannot fail.
pub trait CueOutlet {
    fn submit(&mut self, request: CueRequest);
}

/// Records every request; handy for asserting on cue order
impl CueOutlet for Vec<CueRequest> {
    fn submit(&mut self, request: CueRequest) {
        self.push(request);
    }
}

// ============================================================================
// Scheduling policy
// ============================================================================

/// Which cue channels are currently allowed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CueFlags {
    pub audio: bool,
    pub haptics: bool,
}

impl CueFlags {
    fn any(self) -> bool {
        self.audio || self.haptics
    }
}

/// Decides when countdown and transition cues fire
///
/// Tracks the last countdown second cued in the current block so each second
/// fires at most once.
#[derive(Clone, Debug)]
pub struct CueScheduler {
    countdown_seconds: u32,
    last_cued_second: Option<i64>,
}

impl Default for CueScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECONDS)
    }
}

impl CueScheduler {
    pub fn new(countdown_seconds: u32) -> Self {
        Self {
            countdown_seconds,
            last_cued_second: None,
        }
    }

    /// Forget the last cued second (new block, restart, skip)
    pub fn clear(&mut self) {
        self.last_cued_second = None;
    }

    pub fn last_cued_second(&self) -> Option<i64> {
        self.last_cued_second
    }

    /// Countdown cues for the given remaining time, if a new second was entered
    pub fn countdown(&mut self, remaining_sec: f64, flags: CueFlags) -> Vec<CueRequest> {
        if !flags.any() {
            return Vec::new();
        }

        let seconds_left = remaining_sec.ceil() as i64;
        if seconds_left <= 0 || seconds_left > i64::from(self.countdown_seconds) {
            return Vec::new();
        }
        if self.last_cued_second == Some(seconds_left) {
            return Vec::new();
        }
        self.last_cued_second = Some(seconds_left);

        let (key, pulse) = if seconds_left == 1 {
            (CueKey::CountdownLong, PulseKind::Warning)
        } else {
            (CueKey::CountdownShort, PulseKind::Light)
        };

        let mut cues = Vec::with_capacity(2);
        if flags.audio {
            cues.push(CueRequest::Play(key));
        }
        if flags.haptics {
            cues.push(CueRequest::Pulse(pulse));
        }
        cues
    }

    /// Cues for crossing a block boundary (including completion)
    pub fn transition(flags: CueFlags) -> Vec<CueRequest> {
        let mut cues = Vec::with_capacity(2);
        if flags.audio {
            cues.push(CueRequest::Play(CueKey::Transition));
        }
        if flags.haptics {
            cues.push(CueRequest::Pulse(PulseKind::Success));
        }
        cues
    }
}

// ============================================================================
// Outlets
// ============================================================================

/// Calls the collaborators inline, discarding any failure
pub struct DirectOutlet<A, H> {
    audio: A,
    haptics: H,
}

impl<A: AudioCues, H: Haptics> DirectOutlet<A, H> {
    pub fn new(audio: A, haptics: H) -> Self {
        Self { audio, haptics }
    }

    pub fn into_parts(self) -> (A, H) {
        (self.audio, self.haptics)
    }
}

impl<A: AudioCues, H: Haptics> CueOutlet for DirectOutlet<A, H> {
    fn submit(&mut self, request: CueRequest) {
        match request {
            CueRequest::Play(key) => {
                if let Err(e) = self.audio.play(key) {
                    tracing::debug!("Audio cue {:?} failed: {}", key, e);
                }
            }
            CueRequest::Pulse(kind) => {
                if let Err(e) = self.haptics.pulse(kind) {
                    tracing::debug!("Haptic pulse {:?} failed: {}", kind, e);
                }
            }
            CueRequest::EnableAudio(on) => self.audio.enable(on),
            CueRequest::EnableHaptics(on) => self.haptics.enable(on),
            CueRequest::UnloadAll => self.audio.unload_all(),
        }
    }
}

/// Hands requests to a background worker thread that owns the collaborators
///
/// Slow or failing playback never delays the caller. Dropping the outlet
/// unloads audio and waits for queued requests to drain.
pub struct QueuedOutlet {
    tx: Option<Sender<CueRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl QueuedOutlet {
    /// Start the cue worker thread
    pub fn spawn<A: AudioCues, H: Haptics>(audio: A, haptics: H) -> crate::Result<Self> {
        let (tx, rx) = channel::<CueRequest>();
        let worker = thread::Builder::new()
            .name("cue-worker".into())
            .spawn(move || {
                let mut direct = DirectOutlet::new(audio, haptics);
                for request in rx {
                    direct.submit(request);
                }
                tracing::debug!("Cue worker stopped");
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Unload audio, drain the queue and join the worker
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(CueRequest::UnloadAll);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Cue worker panicked; cues were dropped");
            }
        }
    }
}

impl CueOutlet for QueuedOutlet {
    fn submit(&mut self, request: CueRequest) {
        if let Some(tx) = &self.tx {
            if tx.send(request).is_err() {
                tracing::debug!("Cue worker gone, dropping {:?}", request);
            }
        }
    }
}

impl Drop for QueuedOutlet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Haptics collaborator for devices without a vibration motor
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn enable(&mut self, _enabled: bool) {}

    fn pulse(&mut self, _kind: PulseKind) -> Result<(), CueError> {
        Ok(())
    }
}
