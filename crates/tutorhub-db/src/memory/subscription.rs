use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use tutorhub_core::{
    models::{Subscription, SubscriptionChanges},
    traits::{Repository, SubscriptionRepository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::{MemoryTable, Record};

/// In-memory implementation of SubscriptionRepository
#[derive(Default)]
pub struct MemorySubscriptionRepository {
    table: MemoryTable<Subscription>,
}

impl MemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // Mirrors the CHECK constraint on the subscriptions table
    fn check_counts(entity: &Subscription) -> AppResult<()> {
        if entity.total_sessions <= 0
            || entity.used_sessions < 0
            || entity.used_sessions > entity.total_sessions
        {
            return Err(AppError::Validation(
                "used_sessions must stay between 0 and total_sessions".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Subscription, Uuid> for MemorySubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.table.get(id))
    }

    async fn find_all(&self) -> AppResult<Vec<Subscription>> {
        Ok(self.table.all())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count_all())
    }

    async fn create(&self, entity: &Subscription) -> AppResult<Subscription> {
        Self::check_counts(entity)?;
        Ok(self.table.insert(entity))
    }

    async fn update(&self, entity: &Subscription) -> AppResult<Option<Subscription>> {
        Self::check_counts(entity)?;
        Ok(self.table.update(entity))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id))
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionRepository {
    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self.table.filter(|s| s.student_id == student_id))
    }

    async fn find_active_with_balance(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        Ok(self
            .table
            .filter(|s| s.student_id == student_id && s.is_eligible_at(now)))
    }

    #[instrument(skip(self))]
    async fn consume_session(&self, id: Uuid) -> AppResult<Subscription> {
        let mut rows = self.table.write();
        let subscription = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))?;

        if !subscription.has_balance() {
            warn!("Subscription {} has no sessions left", id);
            return Err(AppError::BalanceExhausted {
                package_name: subscription.package_name.clone(),
                used: subscription.used_sessions,
                total: subscription.total_sessions,
            });
        }

        subscription.used_sessions += 1;
        subscription.touch(Utc::now());
        debug!(
            "Subscription {} used {}/{} sessions",
            id, subscription.used_sessions, subscription.total_sessions
        );
        Ok(subscription.clone())
    }

    #[instrument(skip(self, changes))]
    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
    ) -> AppResult<Option<Subscription>> {
        let mut rows = self.table.write();
        let Some(subscription) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        let mut merged = changes.merged(subscription).map_err(AppError::Validation)?;
        merged.touch(Utc::now());
        *subscription = merged.clone();
        debug!("Subscription {} updated in place", id);
        Ok(Some(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn subscription(student_id: Uuid, total: i32, ends_in: Duration) -> Subscription {
        let now = Utc::now();
        Subscription::new(student_id, "Basic", now - Duration::days(1), now + ends_in, total)
    }

    #[tokio::test]
    async fn test_consume_until_exhausted() {
        let repo = MemorySubscriptionRepository::new();
        let sub = subscription(Uuid::now_v7(), 2, Duration::days(30));
        repo.create(&sub).await.unwrap();

        assert_eq!(repo.consume_session(sub.id).await.unwrap().used_sessions, 1);
        assert_eq!(repo.consume_session(sub.id).await.unwrap().used_sessions, 2);

        let err = repo.consume_session(sub.id).await.unwrap_err();
        assert!(matches!(err, AppError::BalanceExhausted { used: 2, total: 2, .. }));

        let err = repo.consume_session(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::SubscriptionNotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_never_overshoots() {
        let repo = Arc::new(MemorySubscriptionRepository::new());
        let sub = subscription(Uuid::now_v7(), 5, Duration::days(30));
        repo.create(&sub).await.unwrap();

        let id = sub.id;
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.consume_session(id).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }

        assert_eq!(ok, 5);
        let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.used_sessions, 5);
    }

    #[tokio::test]
    async fn test_active_with_balance_filter() {
        let repo = MemorySubscriptionRepository::new();
        let student = Uuid::now_v7();
        let now = Utc::now();

        let expired = subscription(student, 10, Duration::days(-1));
        let mut exhausted = subscription(student, 3, Duration::days(10));
        exhausted.used_sessions = 3;
        let usable = subscription(student, 10, Duration::days(10));
        let other = subscription(Uuid::now_v7(), 10, Duration::days(10));
        for s in [&expired, &exhausted, &usable, &other] {
            repo.create(s).await.unwrap();
        }

        let found = repo.find_active_with_balance(student, now).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, usable.id);
        assert_eq!(repo.list_by_student(student).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_changes_after_consume_keep_used_sessions() {
        let repo = MemorySubscriptionRepository::new();
        let sub = subscription(Uuid::now_v7(), 5, Duration::days(10));
        repo.create(&sub).await.unwrap();

        let before = repo.find_by_id(sub.id).await.unwrap().unwrap();
        repo.consume_session(sub.id).await.unwrap();

        let rename = SubscriptionChanges {
            package_name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = repo.apply_changes(before.id, &rename).await.unwrap().unwrap();
        assert_eq!(updated.package_name, "Renamed");
        assert_eq!(updated.used_sessions, 1);

        let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.used_sessions, 1);

        assert!(repo
            .apply_changes(Uuid::now_v7(), &rename)
            .await
            .unwrap()
            .is_none());

        let overuse = SubscriptionChanges {
            used_sessions: Some(6),
            ..Default::default()
        };
        let err = repo.apply_changes(sub.id, &overuse).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.find_by_id(sub.id).await.unwrap().unwrap().used_sessions, 1);
    }

    #[tokio::test]
    async fn test_update_rejects_overuse() {
        let repo = MemorySubscriptionRepository::new();
        let mut sub = subscription(Uuid::now_v7(), 3, Duration::days(10));
        repo.create(&sub).await.unwrap();

        sub.used_sessions = 4;
        let err = repo.update(&sub).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
