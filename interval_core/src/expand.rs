//! Block expansion: routine → flat execution sequence.
//!
//! Blocks are played in `order`. A run of adjacent blocks sharing a group id
//! is emitted once per repetition of that group. Group members that are not
//! adjacent after sorting form separate runs, each repeated independently.

use crate::{ExpandedBlock, Routine, RoutineBlock};

/// Flatten a routine into the ordered sequence of blocks actually played
///
/// Deterministic and side-effect free. Blocks referencing a group that does
/// not exist are played once, as if ungrouped.
pub fn expand(routine: &Routine) -> Vec<ExpandedBlock> {
    let mut sorted: Vec<&RoutineBlock> = routine.blocks.iter().collect();
    sorted.sort_by_key(|b| b.order);

    let mut expanded = Vec::with_capacity(sorted.len());
    let mut i = 0;

    while i < sorted.len() {
        let Some(group_id) = sorted[i].group_id.as_deref() else {
            push_instance(&mut expanded, sorted[i], 1, 1);
            i += 1;
            continue;
        };

        let run_len = sorted[i..]
            .iter()
            .take_while(|b| b.group_id.as_deref() == Some(group_id))
            .count();
        let run = &sorted[i..i + run_len];

        let repetitions = match routine.group(group_id) {
            Some(group) => group.effective_repetitions(),
            None => {
                tracing::debug!(
                    "Block '{}' references unknown group {}, playing once",
                    sorted[i].name,
                    group_id
                );
                1
            }
        };

        for iteration in 1..=repetitions {
            for block in run {
                push_instance(&mut expanded, block, iteration, repetitions);
            }
        }

        i += run_len;
    }

    expanded
}

fn push_instance(
    out: &mut Vec<ExpandedBlock>,
    block: &RoutineBlock,
    iteration: u32,
    total_iterations: u32,
) {
    out.push(ExpandedBlock {
        block: block.clone(),
        sequence_index: out.len(),
        total_iterations,
        iteration,
    });
}

/// Total playing time of an expanded sequence, every repetition included
pub fn total_duration_sec(blocks: &[ExpandedBlock]) -> f64 {
    blocks.iter().map(|b| f64::from(b.duration_sec())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockKind;

    fn circuit() -> Routine {
        let mut routine = Routine::new("Circuit");
        routine.push_block("Warm-up", BlockKind::Exercise, 60, None);
        let group = routine.push_group("Main set", 3);
        routine.push_block("Burpees", BlockKind::Exercise, 20, Some(&group));
        routine.push_block("Rest", BlockKind::Rest, 10, Some(&group));
        routine.push_block("Cool-down", BlockKind::Rest, 30, None);
        routine
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let routine = circuit();
        assert_eq!(expand(&routine), expand(&routine));
    }

    #[test]
    fn test_group_emitted_once_per_repetition() {
        let expanded = expand(&circuit());
        let names: Vec<_> = expanded.iter().map(|b| b.name()).collect();

        assert_eq!(
            names,
            vec![
                "Warm-up", "Burpees", "Rest", "Burpees", "Rest", "Burpees", "Rest", "Cool-down"
            ]
        );

        let grouped = &expanded[1..7];
        for (offset, block) in grouped.iter().enumerate() {
            assert_eq!(block.total_iterations, 3);
            assert_eq!(block.iteration, offset as u32 / 2 + 1);
        }
    }

    #[test]
    fn test_ungrouped_passthrough() {
        let mut routine = Routine::new("Flat");
        routine.push_block("A", BlockKind::Exercise, 10, None);
        routine.push_block("B", BlockKind::Rest, 5, None);
        routine.push_block("C", BlockKind::Exercise, 10, None);

        let expanded = expand(&routine);

        assert_eq!(expanded.len(), 3);
        assert!(expanded
            .iter()
            .all(|b| b.total_iterations == 1 && b.iteration == 1));
    }

    #[test]
    fn test_sequence_index_has_no_gaps() {
        let expanded = expand(&circuit());
        let indices: Vec<_> = expanded.iter().map(|b| b.sequence_index).collect();
        assert_eq!(indices, (0..expanded.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_blocks_sorted_by_order() {
        let mut routine = Routine::new("Shuffled");
        routine.push_block("First", BlockKind::Exercise, 10, None);
        routine.push_block("Second", BlockKind::Rest, 10, None);
        routine.blocks.reverse();
        routine.blocks[0].order = 5;

        let expanded = expand(&routine);
        assert_eq!(expanded[0].name(), "First");
        assert_eq!(expanded[1].name(), "Second");
    }

    #[test]
    fn test_missing_group_plays_once() {
        let mut routine = Routine::new("Orphan");
        routine.push_block("Lunges", BlockKind::Exercise, 30, Some("no-such-group"));
        routine.push_block("Rest", BlockKind::Rest, 10, Some("no-such-group"));

        let expanded = expand(&routine);

        assert_eq!(expanded.len(), 2);
        assert!(expanded.iter().all(|b| b.total_iterations == 1));
    }

    #[test]
    fn test_zero_repetitions_clamped_to_one() {
        let mut routine = Routine::new("Zero");
        let group = routine.push_group("Never", 0);
        routine.push_block("Sprint", BlockKind::Exercise, 15, Some(&group));

        let expanded = expand(&routine);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].total_iterations, 1);
    }

    #[test]
    fn test_non_contiguous_group_splits_into_runs() {
        let mut routine = Routine::new("Split");
        let group = routine.push_group("Pairs", 2);
        routine.push_block("A", BlockKind::Exercise, 10, Some(&group));
        routine.push_block("Break", BlockKind::Rest, 5, None);
        routine.push_block("B", BlockKind::Exercise, 10, Some(&group));

        let names: Vec<_> = expand(&routine)
            .iter()
            .map(|b| b.name().to_owned())
            .collect();
        assert_eq!(names, vec!["A", "A", "Break", "B", "B"]);
    }

    #[test]
    fn test_empty_routine_expands_to_nothing() {
        let routine = Routine::new("Empty");
        assert!(expand(&routine).is_empty());
    }

    #[test]
    fn test_total_duration_counts_every_repetition() {
        let mut routine = Routine::new("Intervals");
        let group = routine.push_group("x3", 3);
        routine.push_block("Work", BlockKind::Exercise, 20, Some(&group));
        routine.push_block("Rest", BlockKind::Rest, 10, Some(&group));

        assert_eq!(total_duration_sec(&expand(&routine)), 90.0);
    }
}
