//! The maintenance jobs this service runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::subscription::RenewalService;
use crate::workout::AbandonedSessionReaper;

use super::error::Result;
use super::service::ScheduledJob;

pub const REAP_ABANDONED_JOB: &str = "reap-abandoned-workouts";
pub const RENEW_SUBSCRIPTIONS_JOB: &str = "renew-subscriptions";
pub const UPGRADE_REMINDER_JOB: &str = "remind-basic-subscribers";

/// Daily sweep of abandoned in-progress workouts.
pub struct ReapAbandonedJob {
    reaper: AbandonedSessionReaper,
}

impl ReapAbandonedJob {
    pub fn new(reaper: AbandonedSessionReaper) -> Self {
        Self { reaper }
    }
}

#[async_trait]
impl ScheduledJob for ReapAbandonedJob {
    fn name(&self) -> &'static str {
        REAP_ABANDONED_JOB
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<String> {
        let report = self.reaper.sweep(now).await?;
        Ok(format!(
            "removed {} of {} abandoned workouts ({} failed)",
            report.removed.len(),
            report.candidates,
            report.failed
        ))
    }
}

/// Daily renewal rollover for paid subscriptions due today (UTC).
pub struct RenewSubscriptionsJob {
    renewals: RenewalService,
}

impl RenewSubscriptionsJob {
    pub fn new(renewals: RenewalService) -> Self {
        Self { renewals }
    }
}

#[async_trait]
impl ScheduledJob for RenewSubscriptionsJob {
    fn name(&self) -> &'static str {
        RENEW_SUBSCRIPTIONS_JOB
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<String> {
        let renewed = self.renewals.process_renewals(now.date_naive()).await?;
        Ok(format!("renewed {renewed} subscriptions"))
    }
}

/// Periodic upgrade reminder for basic-tier subscribers. Log only.
pub struct UpgradeReminderJob {
    renewals: RenewalService,
}

impl UpgradeReminderJob {
    pub fn new(renewals: RenewalService) -> Self {
        Self { renewals }
    }
}

#[async_trait]
impl ScheduledJob for UpgradeReminderJob {
    fn name(&self) -> &'static str {
        UPGRADE_REMINDER_JOB
    }

    async fn run(&self, _now: DateTime<Utc>) -> Result<String> {
        let reminded = self.renewals.remind_basic_subscribers().await?;
        Ok(format!("reminded {reminded} basic subscribers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::store::file::{FileSubscriberStore, FileWorkoutStore};
    use crate::store::{SessionStore, SubscriberStore};
    use crate::subscription::{Subscriber, SubscriptionTier};
    use crate::sync::KeyedLocks;
    use crate::workout::Session;

    #[tokio::test]
    async fn reap_job_summarizes_sweep() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileWorkoutStore::new(temp.path().join("sessions")));
        let now = Utc::now();
        store
            .create(&Session::start(Uuid::new_v4(), now - Duration::days(10)))
            .await
            .unwrap();
        let job = ReapAbandonedJob::new(AbandonedSessionReaper::new(
            store.clone(),
            KeyedLocks::new(),
            Duration::days(7),
        ));

        let summary = job.run(now).await.unwrap();

        assert_eq!(summary, "removed 1 of 1 abandoned workouts (0 failed)");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn renewal_job_uses_utc_date_of_run() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileSubscriberStore::new(temp.path().join("subscribers.yaml")));
        let due = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();
        store
            .save(&Subscriber {
                user_id: Uuid::new_v4(),
                tier: SubscriptionTier::Pro,
                active: true,
                next_renewal_at: Some(due),
            })
            .await
            .unwrap();
        let renewals = RenewalService::new(store.clone(), Duration::days(30));

        let job = RenewSubscriptionsJob::new(renewals.clone());
        let late_evening = Utc.with_ymd_and_hms(2026, 5, 10, 23, 30, 0).unwrap();
        assert_eq!(job.run(late_evening).await.unwrap(), "renewed 1 subscriptions");

        let stored = store.list().await.unwrap();
        assert_eq!(stored[0].next_renewal_at, Some(due + Duration::days(30)));

        let reminder = UpgradeReminderJob::new(renewals);
        assert_eq!(
            reminder.run(late_evening).await.unwrap(),
            "reminded 0 basic subscribers"
        );
    }
}
