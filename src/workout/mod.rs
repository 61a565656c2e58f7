//! Workout sessions and the sets recorded in them.
//!
//! - [`model`]: sessions, sets and the finish payload
//! - [`grouping`]: readback of sets as per-exercise blocks
//! - [`WorkoutService`]: start / finish / delete
//! - [`AbandonedSessionReaper`]: scheduled cleanup of unfinished sessions

mod error;
pub mod grouping;
pub mod model;
mod reaper;
mod service;

pub use error::{WorkoutError, WorkoutResult};
pub use grouping::{ExerciseBlock, group_into_blocks};
pub use model::{
    ExercisePayload, InconsistentSession, NewSet, Session, SessionId, SessionState, SessionStatus,
    SetGroupType, SetId, SetPayload, WorkoutSet,
};
pub use reaper::{AbandonedSessionReaper, DEFAULT_ABANDON_AFTER_DAYS, ReapReport};
pub use service::{SessionDetails, WorkoutService};
