//! Loading routines from JSON or TOML files.
//!
//! Files may omit ids, routine ids and timestamps; they are filled in on load.
//! Problems the engine tolerates (unknown group, zero-length block, scattered
//! group members) are logged as warnings instead of rejected.

use crate::catalog::get_default_catalog;
use crate::{Error, Result, Routine};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Read, normalize and validate a routine file (`.json` or `.toml`)
pub fn load_routine(path: &Path) -> Result<Routine> {
    let contents = std::fs::read_to_string(path)?;

    let mut routine: Routine = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        Some("toml") => toml::from_str(&contents)?,
        _ => {
            return Err(Error::RoutineValidation(format!(
                "Unsupported routine file {:?} (expected .json or .toml)",
                path
            )))
        }
    };

    normalize(&mut routine);
    validate_routine(&routine)?;
    tracing::debug!(
        "Loaded routine '{}' ({} blocks) from {:?}",
        routine.name,
        routine.blocks.len(),
        path
    );
    Ok(routine)
}

/// Fill in identifiers and derived fields a hand-written file may leave out
fn normalize(routine: &mut Routine) {
    if routine.id.is_empty() {
        routine.id = Uuid::new_v4().to_string();
    }

    for block in &mut routine.blocks {
        if block.id.is_empty() {
            block.id = Uuid::new_v4().to_string();
        }
        if block.routine_id.is_empty() {
            block.routine_id = routine.id.clone();
        }
    }

    for group in &mut routine.groups {
        if group.routine_id.is_empty() {
            group.routine_id = routine.id.clone();
        }
    }

    routine.total_duration_sec = routine.blocks.iter().map(|b| b.duration_sec).sum();
}

/// Reject structurally broken routines, warn about merely odd ones
pub fn validate_routine(routine: &Routine) -> Result<()> {
    if routine.name.trim().is_empty() {
        return Err(Error::RoutineValidation("routine name is empty".into()));
    }

    let mut block_ids = HashSet::new();
    for block in &routine.blocks {
        if block.name.trim().is_empty() {
            return Err(Error::RoutineValidation(format!(
                "block {} has an empty name",
                block.id
            )));
        }
        if !block_ids.insert(block.id.as_str()) {
            return Err(Error::RoutineValidation(format!(
                "duplicate block id {}",
                block.id
            )));
        }
        if block.duration_sec == 0 {
            tracing::warn!("Block '{}' has zero duration", block.name);
        }
        if let Some(group_id) = &block.group_id {
            if routine.group(group_id).is_none() {
                tracing::warn!(
                    "Block '{}' references unknown group {}; it will play once",
                    block.name,
                    group_id
                );
            }
        }
    }

    let mut group_ids = HashSet::new();
    for group in &routine.groups {
        if !group_ids.insert(group.id.as_str()) {
            return Err(Error::RoutineValidation(format!(
                "duplicate group id {}",
                group.id
            )));
        }
    }

    for group_id in scattered_groups(routine) {
        tracing::warn!(
            "Members of group {} are not adjacent; each run repeats separately",
            group_id
        );
    }

    Ok(())
}

/// Group ids whose members form more than one run once sorted by `order`
pub fn scattered_groups(routine: &Routine) -> Vec<String> {
    let mut sorted: Vec<_> = routine.blocks.iter().collect();
    sorted.sort_by_key(|b| b.order);

    let mut seen = HashSet::new();
    let mut scattered = Vec::new();
    let mut previous: Option<&str> = None;

    for block in sorted {
        let current = block.group_id.as_deref();
        if let Some(group_id) = current {
            if previous != Some(group_id)
                && !seen.insert(group_id)
                && !scattered.iter().any(|s| s == group_id)
            {
                scattered.push(group_id.to_owned());
            }
        }
        previous = current;
    }

    scattered
}

/// Find a routine by built-in id, file path, or name inside `routines_dir`
pub fn resolve_routine(name_or_path: &str, routines_dir: &Path) -> Result<Routine> {
    if let Some(routine) = get_default_catalog().get(name_or_path) {
        return Ok(routine.clone());
    }

    let direct = PathBuf::from(name_or_path);
    if direct.is_file() {
        return load_routine(&direct);
    }

    for ext in EXTENSIONS {
        let candidate = routines_dir.join(format!("{}.{}", name_or_path, ext));
        if candidate.is_file() {
            return load_routine(&candidate);
        }
    }

    Err(Error::UnknownRoutine(name_or_path.to_owned()))
}
