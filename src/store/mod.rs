//! Storage abstraction layer for Ironlog.
//!
//! This module defines trait interfaces for all persistence operations,
//! with file-based implementations provided in the `file` submodule.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │           WorkoutService / reaper / renewal pass                │
//! └──────────────────────────┬──────────────────────────────────────┘
//!                            │ uses traits
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     store/ (traits)                             │
//! │  SessionStore, SetStore, ExerciseCatalog, SubscriberStore       │
//! └──────────────────────────┬──────────────────────────────────────┘
//!                            │ implementations
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     store/file/                                 │
//! │  FileWorkoutStore, FileExerciseCatalog, FileSubscriberStore     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Naming Conventions
//!
//! - `list` - enumerate all entities
//! - `load` - read a single entity, returns `Option` if not found
//! - `save` - create or update (upsert semantics, must be atomic)
//! - `delete` - remove an entity, missing entities are not an error

pub mod error;

mod exercise;
mod session;
mod set;
mod subscriber;

pub mod file;

pub use error::{StorageError, StorageResult};
pub use exercise::ExerciseCatalog;
pub use session::SessionStore;
pub use set::SetStore;
pub use subscriber::SubscriberStore;
