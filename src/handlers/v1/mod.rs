//! V1 API handlers.

mod exercises;
mod workouts;

pub use exercises::list_exercises;
pub use workouts::{delete_workout, finish_workout, get_workout, list_workouts, start_workout};
