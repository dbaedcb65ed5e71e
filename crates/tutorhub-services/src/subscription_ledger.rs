//! Subscription ledger
//!
//! Owns subscription records and their session balance:
//! - Query which subscriptions can still pay for a class
//! - Pick the subscription that makes a student eligible to enroll
//! - Consume exactly one session, atomically
//! - Plain create/read/update/delete with validation

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use tutorhub_core::{
    models::{Subscription, SubscriptionChanges},
    traits::{Repository, SubscriptionRepository},
    AppError, AppResult,
};
use tutorhub_db::Store;
use uuid::Uuid;

/// Breakdown of a student's subscriptions at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    /// Subscriptions on record
    pub total: usize,
    /// Subscriptions whose end date has not passed
    pub active: usize,
    /// Subscriptions with every session used
    pub exhausted: usize,
}

impl Eligibility {
    fn of(subscriptions: &[Subscription], now: DateTime<Utc>) -> Self {
        Self {
            total: subscriptions.len(),
            active: subscriptions.iter().filter(|s| s.is_active_at(now)).count(),
            exhausted: subscriptions.iter().filter(|s| !s.has_balance()).count(),
        }
    }

    /// Human readable explanation used in `NoActiveSubscription`
    pub fn describe(&self) -> String {
        if self.total == 0 {
            return "student has no subscriptions".to_string();
        }
        format!(
            "{} subscription(s) on record, {} active, {} with no sessions left",
            self.total, self.active, self.exhausted
        )
    }
}

/// Subscription ledger service
#[derive(Clone)]
pub struct SubscriptionLedger {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionLedger {
    /// Create a ledger over a subscription repository
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Create a ledger over the store's subscription repository
    pub fn from_store(store: &Store) -> Self {
        Self::new(Arc::clone(&store.subscriptions))
    }

    /// Subscriptions of a student that are active and have balance left
    ///
    /// Ordered by creation; empty if none qualify.
    #[instrument(skip(self))]
    pub async fn active_with_balance(&self, student_id: Uuid) -> AppResult<Vec<Subscription>> {
        self.subscriptions
            .find_active_with_balance(student_id, Utc::now())
            .await
    }

    /// The subscription that makes a student eligible for a new enrollment
    ///
    /// Picks the first active subscription with balance in creation order.
    /// Fails with `NoActiveSubscription` carrying a breakdown of what the
    /// student does have.
    #[instrument(skip(self))]
    pub async fn select_for_enrollment(&self, student_id: Uuid) -> AppResult<Subscription> {
        let now = Utc::now();
        let usable = self
            .subscriptions
            .find_active_with_balance(student_id, now)
            .await?;

        if let Some(first) = usable.into_iter().next() {
            debug!(
                "Student {} eligible through subscription {} ({} sessions left)",
                student_id,
                first.id,
                first.remaining_sessions()
            );
            return Ok(first);
        }

        let all = self.subscriptions.list_by_student(student_id).await?;
        let eligibility = Eligibility::of(&all, now);
        warn!(
            "Student {} has no usable subscription: {}",
            student_id,
            eligibility.describe()
        );
        Err(AppError::NoActiveSubscription(eligibility.describe()))
    }

    /// Use one session of a subscription
    #[instrument(skip(self))]
    pub async fn consume_session(&self, id: Uuid) -> AppResult<Subscription> {
        let subscription = self.subscriptions.consume_session(id).await?;
        info!(
            "Session recorded on subscription {} ({}/{})",
            id, subscription.used_sessions, subscription.total_sessions
        );
        Ok(subscription)
    }

    /// Get a subscription by id
    pub async fn get(&self, id: Uuid) -> AppResult<Subscription> {
        self.subscriptions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))
    }

    /// List all subscriptions, or those of one student
    pub async fn list(&self, student_id: Option<Uuid>) -> AppResult<Vec<Subscription>> {
        match student_id {
            Some(student_id) => self.subscriptions.list_by_student(student_id).await,
            None => self.subscriptions.find_all().await,
        }
    }

    /// Store a new subscription after validating it
    #[instrument(skip(self, subscription), fields(student_id = %subscription.student_id))]
    pub async fn create(&self, subscription: &Subscription) -> AppResult<Subscription> {
        subscription.validate().map_err(AppError::Validation)?;
        let created = self.subscriptions.create(subscription).await?;
        info!("Subscription created: {} ({})", created.id, created.package_name);
        Ok(created)
    }

    /// Apply a partial change to a stored subscription
    ///
    /// The merged record is validated before it is written. Fields the change
    /// leaves out keep their stored value, including sessions consumed after
    /// the caller last read the subscription.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: &SubscriptionChanges) -> AppResult<Subscription> {
        let updated = self
            .subscriptions
            .apply_changes(id, changes)
            .await?
            .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))?;
        info!("Subscription updated: {} ({})", updated.id, updated.package_name);
        Ok(updated)
    }

    /// Delete a subscription
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.subscriptions.delete(id).await? {
            return Err(AppError::SubscriptionNotFound(id.to_string()));
        }
        info!("Subscription deleted: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sub(total: i32, used: i32, ends_in: Duration) -> Subscription {
        let now = Utc::now();
        let mut s = Subscription::new(
            Uuid::now_v7(),
            "Basic",
            now - Duration::days(5),
            now + ends_in,
            total,
        );
        s.used_sessions = used;
        s
    }

    #[test]
    fn test_eligibility_breakdown() {
        let now = Utc::now();
        let subs = vec![
            sub(10, 10, Duration::days(5)),
            sub(10, 2, Duration::days(-1)),
        ];
        let e = Eligibility::of(&subs, now);
        assert_eq!(e, Eligibility { total: 2, active: 1, exhausted: 1 });
        assert!(e.describe().contains("2 subscription(s)"));

        assert_eq!(Eligibility::of(&[], now).describe(), "student has no subscriptions");
    }
}
