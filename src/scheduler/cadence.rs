//! When a job fires.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use super::error::{Result, SchedulerError};

/// Firing rule for a scheduled job. All times are UTC.
#[derive(Clone)]
pub enum Cadence {
    /// Cron expression in the 7-field `sec min hour dom month dow year` form.
    Cron(Box<cron::Schedule>),
    /// Fixed interval measured from the previous firing.
    Every(Duration),
}

impl Cadence {
    pub fn cron(expr: &str) -> Result<Self> {
        cron::Schedule::from_str(expr)
            .map(|s| Self::Cron(Box::new(s)))
            .map_err(|e| SchedulerError::InvalidCron(format!("{expr}: {e}")))
    }

    pub fn every(interval: Duration) -> Result<Self> {
        if interval <= Duration::zero() {
            return Err(SchedulerError::InvalidSchedule(
                "interval must be positive".to_string(),
            ));
        }
        Ok(Self::Every(interval))
    }

    /// First firing strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Cron(schedule) => schedule.after(&after).next(),
            Self::Every(interval) => after.checked_add_signed(*interval),
        }
    }
}

impl fmt::Debug for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cron(schedule) => write!(f, "Cron({schedule})"),
            Self::Every(interval) => write!(f, "Every({interval})"),
        }
    }
}
