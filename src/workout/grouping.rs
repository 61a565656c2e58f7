//! Reassembles a session's flat set list into per-exercise display blocks.

use std::collections::HashMap;

use serde::Serialize;

use crate::exercise::{Exercise, ExerciseId};

use super::model::WorkoutSet;

/// A contiguous run of sets for one exercise.
///
/// Borrows both the exercise (from the batch-fetched map) and the run of
/// sets (from the ordered slice); nothing is copied.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExerciseBlock<'a> {
    pub exercise: &'a Exercise,
    pub sets: &'a [WorkoutSet],
}

/// Split `sets` into blocks, starting a new block whenever the exercise id
/// changes from the previous set.
///
/// `sets` must already be ordered by `(exercise_order, id)`. An exercise that
/// shows up in two separated runs yields two blocks. Runs whose exercise is
/// absent from `exercises` are omitted.
pub fn group_into_blocks<'a>(
    sets: &'a [WorkoutSet],
    exercises: &'a HashMap<ExerciseId, Exercise>,
) -> Vec<ExerciseBlock<'a>> {
    sets.chunk_by(|a, b| a.exercise_id == b.exercise_id)
        .filter_map(|run| {
            let exercise = exercises.get(&run[0].exercise_id)?;
            Some(ExerciseBlock {
                exercise,
                sets: run,
            })
        })
        .collect()
}

/// Distinct exercise ids referenced by `sets`, in first-seen order.
pub fn referenced_exercises(sets: &[WorkoutSet]) -> Vec<ExerciseId> {
    let mut ids = Vec::new();
    for set in sets {
        if !ids.contains(&set.exercise_id) {
            ids.push(set.exercise_id);
        }
    }
    ids
}
