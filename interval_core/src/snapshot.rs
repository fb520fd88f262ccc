//! Projection of engine state into the published snapshot.

use crate::expand::total_duration_sec;
use crate::{ExpandedBlock, IntervalSnapshot, TimerStatus};

/// Everything the projector reads, borrowed from the engine
#[derive(Clone, Copy, Debug)]
pub struct ProjectionInput<'a> {
    pub status: TimerStatus,
    pub blocks: &'a [ExpandedBlock],
    pub audio_enabled: bool,
    pub haptics_enabled: bool,
    pub current_index: usize,
    pub remaining_sec: f64,
    pub total_elapsed_sec: f64,
}

/// Build a fresh snapshot; never touches its input
pub fn project(input: &ProjectionInput<'_>) -> IntervalSnapshot {
    let current = input.blocks.get(input.current_index);
    let next = input
        .current_index
        .checked_add(1)
        .and_then(|i| input.blocks.get(i));

    let total_duration = total_duration_sec(input.blocks);
    let current_duration = current.map_or(0.0, |b| f64::from(b.duration_sec()));

    IntervalSnapshot {
        status: input.status,
        audio_enabled: input.audio_enabled,
        haptics_enabled: input.haptics_enabled,
        current_block: current.cloned(),
        next_block: next.cloned(),
        current_index: input.current_index,
        total_blocks: input.blocks.len(),
        current_elapsed_sec: clamp(current_duration - input.remaining_sec, current_duration),
        current_remaining_sec: clamp(input.remaining_sec, current_duration),
        total_elapsed_sec: clamp(input.total_elapsed_sec, total_duration),
        total_duration_sec: total_duration,
    }
}

fn clamp(value: f64, max: f64) -> f64 {
    value.max(0.0).min(max)
}
