//! Subscription renewal rollover and basic-tier upgrade reminders.
//!
//! Billing is handled elsewhere; this module only advances the renewal date
//! of active paid subscriptions once it comes due.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exercise::UserId;
use crate::store::{StorageResult, SubscriberStore};

/// Default length of one paid renewal period.
pub const DEFAULT_RENEWAL_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Basic,
    Pro,
}

/// Subscription state of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: UserId,
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_renewal_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// Active paid subscription whose renewal falls on `today`.
    pub fn renews_on(&self, today: NaiveDate) -> bool {
        self.active
            && self.tier == SubscriptionTier::Pro
            && self
                .next_renewal_at
                .is_some_and(|at| at.date_naive() == today)
    }
}

/// Applies renewal rollover against a [`SubscriberStore`].
#[derive(Clone)]
pub struct RenewalService {
    store: Arc<dyn SubscriberStore>,
    period: Duration,
}

impl RenewalService {
    pub fn new(store: Arc<dyn SubscriberStore>, period: Duration) -> Self {
        Self { store, period }
    }

    /// Advance the renewal date of every subscriber due on `today`.
    ///
    /// Returns the number of subscriptions renewed.
    pub async fn process_renewals(&self, today: NaiveDate) -> StorageResult<usize> {
        let mut renewed = 0;
        for mut subscriber in self.store.list().await? {
            if !subscriber.renews_on(today) {
                continue;
            }
            let Some(current) = subscriber.next_renewal_at else {
                continue;
            };
            let next = current + self.period;
            subscriber.next_renewal_at = Some(next);
            self.store.save(&subscriber).await?;
            info!(user_id = %subscriber.user_id, next_renewal_at = %next, "Pro subscription renewed");
            renewed += 1;
        }
        Ok(renewed)
    }

    /// Log an upgrade reminder for every basic-tier subscriber. No state changes.
    ///
    /// Returns the number of reminders logged.
    pub async fn remind_basic_subscribers(&self) -> StorageResult<usize> {
        let mut reminded = 0;
        for subscriber in self.store.list().await? {
            if subscriber.tier == SubscriptionTier::Basic {
                info!(user_id = %subscriber.user_id, "Basic subscriber should consider upgrading to pro");
                reminded += 1;
            }
        }
        Ok(reminded)
    }
}
