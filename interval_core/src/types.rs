//! Core domain types for the interval player.
//!
//! This module defines the fundamental types used throughout the system:
//! - Routines, their blocks and repeated groups
//! - Expanded (repetition-resolved) blocks
//! - Timer status and the published snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Routine Types
// ============================================================================

/// Whether a block is work or recovery
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Exercise,
    Rest,
}

/// One timed step of a routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutineBlock {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub routine_id: String,
    pub name: String,
    pub kind: BlockKind,
    pub duration_sec: u32,
    pub order: i32,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// A series of contiguous blocks played several times in a row
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutineGroup {
    pub id: String,
    #[serde(default)]
    pub routine_id: String,
    pub label: String,
    pub repetitions: u32,
}

impl RoutineGroup {
    /// Repetition count with the minimum of one applied
    pub fn effective_repetitions(&self) -> u32 {
        self.repetitions.max(1)
    }
}

/// A complete workout definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Sum of authored block durations (groups not multiplied out)
    #[serde(default)]
    pub total_duration_sec: u32,
    #[serde(default)]
    pub blocks: Vec<RoutineBlock>,
    #[serde(default)]
    pub groups: Vec<RoutineGroup>,
}

impl Routine {
    /// Create an empty routine with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            note: None,
            created_at: now,
            updated_at: now,
            total_duration_sec: 0,
            blocks: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Append a block after the current last one and return its id
    pub fn push_block(
        &mut self,
        name: impl Into<String>,
        kind: BlockKind,
        duration_sec: u32,
        group_id: Option<&str>,
    ) -> String {
        let order = self
            .blocks
            .iter()
            .map(|b| b.order)
            .max()
            .map_or(0, |max| max + 1);
        let id = Uuid::new_v4().to_string();

        self.blocks.push(RoutineBlock {
            id: id.clone(),
            routine_id: self.id.clone(),
            name: name.into(),
            kind,
            duration_sec,
            order,
            group_id: group_id.map(str::to_owned),
        });
        self.touch();
        id
    }

    /// Register a repeated group and return its id
    pub fn push_group(&mut self, label: impl Into<String>, repetitions: u32) -> String {
        let id = Uuid::new_v4().to_string();
        self.groups.push(RoutineGroup {
            id: id.clone(),
            routine_id: self.id.clone(),
            label: label.into(),
            repetitions,
        });
        self.touch();
        id
    }

    /// Look up a group by id
    pub fn group(&self, id: &str) -> Option<&RoutineGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Recompute the derived duration and bump `updated_at`
    pub fn touch(&mut self) {
        self.total_duration_sec = self.blocks.iter().map(|b| b.duration_sec).sum();
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Engine Types
// ============================================================================

/// A block instance in the flattened execution order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpandedBlock {
    #[serde(flatten)]
    pub block: RoutineBlock,
    pub sequence_index: usize,
    pub total_iterations: u32,
    pub iteration: u32,
}

impl ExpandedBlock {
    pub fn duration_sec(&self) -> u32 {
        self.block.duration_sec
    }

    pub fn name(&self) -> &str {
        &self.block.name
    }

    pub fn kind(&self) -> BlockKind {
        self.block.kind
    }
}

/// Lifecycle of the timer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Read-only view of the engine, re-published after every mutation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntervalSnapshot {
    pub status: TimerStatus,
    pub audio_enabled: bool,
    pub haptics_enabled: bool,
    pub current_block: Option<ExpandedBlock>,
    pub next_block: Option<ExpandedBlock>,
    pub current_index: usize,
    pub total_blocks: usize,
    pub current_elapsed_sec: f64,
    pub current_remaining_sec: f64,
    pub total_elapsed_sec: f64,
    pub total_duration_sec: f64,
}
