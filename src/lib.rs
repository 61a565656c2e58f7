//! Ironlog - workout session recording with best-effort analytics sync.

// ============================================================================
// Core Infrastructure
// ============================================================================

pub mod build_info;
pub mod config;
pub mod store;
pub mod sync;

// ============================================================================
// Server & HTTP
// ============================================================================

pub mod api;
pub mod handlers;
pub mod server;

// ============================================================================
// Domain
// ============================================================================

pub mod analytics;
pub mod exercise;
pub mod scheduler;
pub mod subscription;
pub mod workout;

// ============================================================================
// Utilities
// ============================================================================

pub mod background;
