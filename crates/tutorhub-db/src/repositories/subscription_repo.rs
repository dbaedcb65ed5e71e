//! Subscription repository implementation
//!
//! Session consumption is a single conditional UPDATE so concurrent callers
//! can never push `used_sessions` past `total_sessions`. Partial changes lock
//! the row first, so they queue behind consumption instead of overwriting it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, instrument, warn};
use tutorhub_core::{
    models::{Subscription, SubscriptionChanges},
    traits::{Repository, SubscriptionRepository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::violation_kind;

/// PostgreSQL implementation of SubscriptionRepository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn write_error(id: Uuid, e: sqlx::Error) -> AppError {
        error!("Database error writing subscription {}: {}", id, e);
        match violation_kind(&e) {
            Some(ErrorKind::CheckViolation) => AppError::Validation(
                "used_sessions must stay between 0 and total_sessions".to_string(),
            ),
            _ => AppError::Database(format!("Failed to write subscription: {}", e)),
        }
    }
}

#[async_trait]
impl Repository<Subscription, Uuid> for PgSubscriptionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        debug!("Finding subscription by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT id, student_id, package_name, start_date, end_date,
                   total_sessions, used_sessions, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding subscription {}: {}", id, e);
            AppError::Database(format!("Failed to find subscription: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Subscription>> {
        debug!("Listing all subscriptions");

        let rows = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT id, student_id, package_name, start_date, end_date,
                   total_sessions, used_sessions, created_at, updated_at
            FROM subscriptions
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscriptions: {}", e);
            AppError::Database(format!("Failed to list subscriptions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscriptions: {}", e);
                AppError::Database(format!("Failed to count subscriptions: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Subscription) -> AppResult<Subscription> {
        debug!(
            "Creating subscription {} for student {}",
            entity.package_name, entity.student_id
        );

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (
                id, student_id, package_name, start_date, end_date,
                total_sessions, used_sessions, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, student_id, package_name, start_date, end_date,
                      total_sessions, used_sessions, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.student_id)
        .bind(&entity.package_name)
        .bind(entity.start_date)
        .bind(entity.end_date)
        .bind(entity.total_sessions)
        .bind(entity.used_sessions)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity.id, e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Subscription) -> AppResult<Option<Subscription>> {
        debug!("Updating subscription: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET student_id = $2,
                package_name = $3,
                start_date = $4,
                end_date = $5,
                total_sessions = $6,
                used_sessions = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, student_id, package_name, start_date, end_date,
                      total_sessions, used_sessions, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.student_id)
        .bind(&entity.package_name)
        .bind(entity.start_date)
        .bind(entity.end_date)
        .bind(entity.total_sessions)
        .bind(entity.used_sessions)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity.id, e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting subscription: {}", id);

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting subscription {}: {}", id, e);
                AppError::Database(format!("Failed to delete subscription: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    #[instrument(skip(self))]
    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Subscription>> {
        debug!("Listing subscriptions of student: {}", student_id);

        let rows = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT id, student_id, package_name, start_date, end_date,
                   total_sessions, used_sessions, created_at, updated_at
            FROM subscriptions
            WHERE student_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscriptions of {}: {}", student_id, e);
            AppError::Database(format!("Failed to list subscriptions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_active_with_balance(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        debug!("Finding usable subscriptions of student: {}", student_id);

        let rows = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT id, student_id, package_name, start_date, end_date,
                   total_sessions, used_sessions, created_at, updated_at
            FROM subscriptions
            WHERE student_id = $1
              AND end_date >= $2
              AND used_sessions < total_sessions
            ORDER BY created_at, id
            "#,
        )
        .bind(student_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding usable subscriptions of {}: {}",
                student_id, e
            );
            AppError::Database(format!("Failed to find subscriptions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn consume_session(&self, id: Uuid) -> AppResult<Subscription> {
        debug!("Consuming one session of subscription: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET used_sessions = used_sessions + 1,
                updated_at = NOW()
            WHERE id = $1
              AND used_sessions < total_sessions
            RETURNING id, student_id, package_name, start_date, end_date,
                      total_sessions, used_sessions, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error consuming session of {}: {}", id, e);
            AppError::Database(format!("Failed to consume session: {}", e))
        })?;

        if let Some(row) = row {
            let subscription: Subscription = row.into();
            info!(
                "Subscription {} used {}/{} sessions",
                id, subscription.used_sessions, subscription.total_sessions
            );
            return Ok(subscription);
        }

        // Nothing updated: either missing or out of sessions
        match self.find_by_id(id).await? {
            Some(subscription) => {
                warn!("Subscription {} has no sessions left", id);
                Err(AppError::BalanceExhausted {
                    package_name: subscription.package_name,
                    used: subscription.used_sessions,
                    total: subscription.total_sessions,
                })
            }
            None => Err(AppError::SubscriptionNotFound(id.to_string())),
        }
    }

    #[instrument(skip(self, changes))]
    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
    ) -> AppResult<Option<Subscription>> {
        debug!("Applying changes to subscription: {}", id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let current = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT id, student_id, package_name, start_date, end_date,
                   total_sessions, used_sessions, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error locking subscription {}: {}", id, e);
            AppError::Database(format!("Failed to lock subscription: {}", e))
        })?;

        let Some(current) = current else {
            return Ok(None);
        };
        let current: Subscription = current.into();

        let merged = changes.merged(&current).map_err(AppError::Validation)?;

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET student_id = $2,
                package_name = $3,
                start_date = $4,
                end_date = $5,
                total_sessions = $6,
                used_sessions = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, student_id, package_name, start_date, end_date,
                      total_sessions, used_sessions, created_at, updated_at
            "#,
        )
        .bind(merged.id)
        .bind(merged.student_id)
        .bind(&merged.package_name)
        .bind(merged.start_date)
        .bind(merged.end_date)
        .bind(merged.total_sessions)
        .bind(merged.used_sessions)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::write_error(id, e))?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(Some(row.into()))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: Uuid,
    student_id: Uuid,
    package_name: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    total_sessions: i32,
    used_sessions: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            package_name: row.package_name,
            start_date: row.start_date,
            end_date: row.end_date,
            total_sessions: row.total_sessions,
            used_sessions: row.used_sessions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, run_migrations};
    use chrono::Duration;

    async fn repo() -> PgSubscriptionRepository {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tutorhub_test".to_string());
        let pool = create_pool(&url, Some(5)).await.unwrap();
        run_migrations(&pool).await.unwrap();
        PgSubscriptionRepository::new(pool)
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_consume_session_stops_at_total() {
        let repo = repo().await;
        let now = Utc::now();
        let sub = Subscription::new(Uuid::now_v7(), "Trial", now, now + Duration::days(7), 2);
        repo.create(&sub).await.unwrap();

        assert_eq!(repo.consume_session(sub.id).await.unwrap().used_sessions, 1);
        assert_eq!(repo.consume_session(sub.id).await.unwrap().used_sessions, 2);
        let err = repo.consume_session(sub.id).await.unwrap_err();
        assert!(matches!(err, AppError::BalanceExhausted { .. }));

        let err = repo.consume_session(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::SubscriptionNotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_rename_keeps_sessions_consumed_since_read() {
        let repo = repo().await;
        let now = Utc::now();
        let sub = Subscription::new(Uuid::now_v7(), "Trial", now, now + Duration::days(7), 4);
        repo.create(&sub).await.unwrap();

        repo.consume_session(sub.id).await.unwrap();
        let rename = SubscriptionChanges {
            package_name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = repo.apply_changes(sub.id, &rename).await.unwrap().unwrap();
        assert_eq!(updated.package_name, "Renamed");
        assert_eq!(updated.used_sessions, 1);
    }
}
