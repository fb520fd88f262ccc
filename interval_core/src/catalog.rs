//! Built-in routines.
//!
//! A small set of ready-to-play workouts so the player is useful without any
//! routine files on disk.

use crate::expand::{expand, total_duration_sec};
use crate::routine_file::validate_routine;
use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Routines keyed by a short, stable id (e.g. `tabata`)
#[derive(Clone, Debug)]
pub struct Catalog {
    pub routines: BTreeMap<String, Routine>,
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    let mut routines = BTreeMap::new();

    // Tabata: 8 rounds of 20s on / 10s off
    let mut tabata = builtin(
        "tabata",
        "Tabata (8 x 20/10)",
        "Go all out for 20 seconds, recover for 10.",
    );
    let rounds = tabata.push_group("Rounds", 8);
    tabata.push_block("Work", BlockKind::Exercise, 20, Some(&rounds));
    tabata.push_block("Rest", BlockKind::Rest, 10, Some(&rounds));
    routines.insert(tabata.id.clone(), tabata);

    // EMOM: 10 minutes, 45s work with the rest of the minute off
    let mut emom = builtin(
        "emom_10",
        "10-Min EMOM",
        "Finish the set in 45 seconds, rest the remainder of the minute.",
    );
    let minutes = emom.push_group("Minutes", 10);
    emom.push_block("Work", BlockKind::Exercise, 45, Some(&minutes));
    emom.push_block("Rest", BlockKind::Rest, 15, Some(&minutes));
    routines.insert(emom.id.clone(), emom);

    // Warm-up circuit, no repeats
    let mut warmup = builtin(
        "warmup",
        "5-Min Warm-up",
        "Easy pace. Loosen up before the main set.",
    );
    warmup.push_block("Jumping Jacks", BlockKind::Exercise, 60, None);
    warmup.push_block("Hip Circles", BlockKind::Exercise, 45, None);
    warmup.push_block("Rest", BlockKind::Rest, 15, None);
    warmup.push_block("Arm Swings", BlockKind::Exercise, 45, None);
    warmup.push_block("Bodyweight Squats", BlockKind::Exercise, 60, None);
    warmup.push_block("Rest", BlockKind::Rest, 15, None);
    warmup.push_block("High Knees", BlockKind::Exercise, 60, None);
    routines.insert(warmup.id.clone(), warmup);

    Catalog { routines }
}

fn builtin(id: &str, name: &str, note: &str) -> Routine {
    let mut routine = Routine::new(name).with_note(note);
    routine.id = id.into();
    routine
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&Routine> {
        self.routines.get(id)
    }

    /// Routine ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty vector if valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, routine) in &self.routines {
            if id != &routine.id {
                errors.push(format!(
                    "Routine '{}' stored under mismatched key '{}'",
                    routine.id, id
                ));
            }

            if let Err(e) = validate_routine(routine) {
                errors.push(format!("Routine '{}': {}", id, e));
            }

            let expanded = expand(routine);
            if expanded.is_empty() {
                errors.push(format!("Routine '{}' has no blocks", id));
            } else if total_duration_sec(&expanded) <= 0.0 {
                errors.push(format!("Routine '{}' has zero total duration", id));
            }

            for block in &routine.blocks {
                if let Some(group_id) = &block.group_id {
                    if routine.group(group_id).is_none() {
                        errors.push(format!(
                            "Routine '{}': block '{}' references missing group {}",
                            id, block.name, group_id
                        ));
                    }
                }
            }
        }

        errors
    }
}
