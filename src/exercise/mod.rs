//! Exercise catalog entries and the ownership predicate used when a
//! workout references them.
//!
//! Exercises are owned by a user or by the shared system owner. The catalog
//! itself is maintained elsewhere; this crate only reads it (see
//! [`crate::store::ExerciseCatalog`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user. Identity is resolved upstream and trusted here.
pub type UserId = Uuid;

/// Identifier of a catalog exercise.
pub type ExerciseId = Uuid;

/// Reserved owner id for the built-in exercises every user may reference.
pub const SYSTEM_OWNER_ID: UserId = Uuid::from_u128(1);

// ============================================================================
// Exercise
// ============================================================================

/// A catalog exercise as resolved by [`crate::store::ExerciseCatalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub attributes: ExerciseAttributes,
}

/// Descriptive attributes carried through to the analytics replica.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_muscle: Option<MuscleGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Equipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Legs,
    Biceps,
    Triceps,
    Forearms,
    Calves,
    Hamstrings,
    Traps,
    Core,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Bodyweight,
    Other,
}

// ============================================================================
// Access
// ============================================================================

/// Ownership predicate for exercise references.
///
/// An exercise is usable by a caller when the caller owns it or when it is
/// owned by the configured system owner.
#[derive(Debug, Clone, Copy)]
pub struct ExerciseAccess {
    system_owner: UserId,
}

impl ExerciseAccess {
    pub fn new(system_owner: UserId) -> Self {
        Self { system_owner }
    }

    pub fn system_owner(&self) -> UserId {
        self.system_owner
    }

    /// Owners whose exercises the caller may reference.
    pub fn visible_owners(&self, caller: UserId) -> [UserId; 2] {
        [self.system_owner, caller]
    }

    pub fn can_use(&self, exercise: &Exercise, caller: UserId) -> bool {
        exercise.owner_id == caller || exercise.owner_id == self.system_owner
    }
}

impl Default for ExerciseAccess {
    fn default() -> Self {
        Self::new(SYSTEM_OWNER_ID)
    }
}
