//! In-process scheduler for maintenance jobs.
//!
//! A single instance is assumed. Two processes running the scheduler against
//! the same data directory will both run every job.

mod cadence;
mod error;
mod jobs;
mod service;

pub use cadence::Cadence;
pub use error::{Result, SchedulerError};
pub use jobs::{
    REAP_ABANDONED_JOB, RENEW_SUBSCRIPTIONS_JOB, ReapAbandonedJob, RenewSubscriptionsJob,
    UPGRADE_REMINDER_JOB, UpgradeReminderJob,
};
pub use service::{ScheduledJob, SchedulerHandle, SchedulerService};
