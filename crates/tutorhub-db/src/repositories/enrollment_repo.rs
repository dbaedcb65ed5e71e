//! Enrollment repository implementation
//!
//! Capacity-checked inserts lock the class row with `SELECT ... FOR UPDATE`
//! so concurrent registrations for the same class are serialized, and the
//! `(class_id, student_id)` unique constraint backs the duplicate check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, instrument, warn};
use tutorhub_core::{
    models::{Class, Enrollment},
    traits::{EnrollmentRepository, Repository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::violation_kind;

/// PostgreSQL implementation of EnrollmentRepository
#[derive(Clone)]
pub struct PgEnrollmentRepository {
    pool: PgPool,
}

impl PgEnrollmentRepository {
    /// Create a new enrollment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, column: &str, value: Uuid) -> AppResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(&format!(
            r#"
            SELECT id, class_id, student_id, created_at, updated_at
            FROM enrollments
            WHERE {} = $1
            ORDER BY created_at, id
            "#,
            column
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing enrollments by {}: {}", column, e);
            AppError::Database(format!("Failed to list class registrations: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Repository<Enrollment, Uuid> for PgEnrollmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        debug!("Finding enrollment by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            SELECT id, class_id, student_id, created_at, updated_at
            FROM enrollments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding enrollment {}: {}", id, e);
            AppError::Database(format!("Failed to find class registration: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Enrollment>> {
        debug!("Listing all enrollments");

        let rows = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            SELECT id, class_id, student_id, created_at, updated_at
            FROM enrollments
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing enrollments: {}", e);
            AppError::Database(format!("Failed to list class registrations: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting enrollments: {}", e);
                AppError::Database(format!("Failed to count class registrations: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Enrollment) -> AppResult<Enrollment> {
        debug!(
            "Creating enrollment of student {} in class {}",
            entity.student_id, entity.class_id
        );

        let row = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            INSERT INTO enrollments (id, class_id, student_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, class_id, student_id, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.class_id)
        .bind(entity.student_id)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating enrollment: {}", e);
            match violation_kind(&e) {
                Some(ErrorKind::UniqueViolation) => AppError::AlreadyExists(
                    "Student is already registered for this class".to_string(),
                ),
                _ => AppError::Database(format!("Failed to create class registration: {}", e)),
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Enrollment) -> AppResult<Option<Enrollment>> {
        debug!("Touching enrollment: {}", entity.id);

        // The pair itself is immutable; only the timestamp moves.
        let row = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            UPDATE enrollments
            SET updated_at = NOW()
            WHERE id = $1
            RETURNING id, class_id, student_id, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating enrollment {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update class registration: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting enrollment: {}", id);

        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting enrollment {}: {}", id, e);
                AppError::Database(format!("Failed to delete class registration: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EnrollmentRepository for PgEnrollmentRepository {
    #[instrument(skip(self))]
    async fn find_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let result = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            SELECT id, class_id, student_id, created_at, updated_at
            FROM enrollments
            WHERE class_id = $1 AND student_id = $2
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding enrollment pair: {}", e);
            AppError::Database(format!("Failed to find class registration: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_class(&self, class_id: Uuid) -> AppResult<Vec<Enrollment>> {
        debug!("Listing enrollments of class: {}", class_id);
        self.list_where("class_id", class_id).await
    }

    #[instrument(skip(self))]
    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        debug!("Listing enrollments of student: {}", student_id);
        self.list_where("student_id", student_id).await
    }

    #[instrument(skip(self))]
    async fn count_by_class(&self, class_id: Uuid) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE class_id = $1")
            .bind(class_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting enrollments of {}: {}", class_id, e);
                AppError::Database(format!("Failed to count class registrations: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, class), fields(class_id = %class.id))]
    async fn insert_within_capacity(
        &self,
        class: &Class,
        student_id: Uuid,
    ) -> AppResult<Enrollment> {
        debug!("Inserting enrollment of student {} within capacity", student_id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock the class row; concurrent inserts for this class queue here
        let locked: Option<(String, i32)> = sqlx::query_as(
            r#"
            SELECT name, max_students
            FROM classes
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(class.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error locking class {}: {}", class.id, e);
            AppError::Database(format!("Failed to lock class: {}", e))
        })?;

        let (class_name, capacity) =
            locked.ok_or_else(|| AppError::ClassNotFound(class.id.to_string()))?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM enrollments WHERE class_id = $1 AND student_id = $2",
        )
        .bind(class.id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error checking enrollment pair: {}", e);
            AppError::Database(format!("Failed to check class registration: {}", e))
        })?;

        if existing.is_some() {
            warn!("Student {} already registered in {}", student_id, class_name);
            return Err(AppError::AlreadyRegistered { class_name });
        }

        let (enrolled,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE class_id = $1")
                .bind(class.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Database error counting enrollments: {}", e);
                    AppError::Database(format!("Failed to count class registrations: {}", e))
                })?;

        if enrolled >= i64::from(capacity) {
            warn!("Class {} is full ({}/{})", class_name, enrolled, capacity);
            return Err(AppError::ClassFull {
                class_name,
                enrolled,
                capacity,
            });
        }

        let enrollment = Enrollment::new(class.id, student_id);
        let row = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            INSERT INTO enrollments (id, class_id, student_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, class_id, student_id, created_at, updated_at
            "#,
        )
        .bind(enrollment.id)
        .bind(enrollment.class_id)
        .bind(enrollment.student_id)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match violation_kind(&e) {
            Some(ErrorKind::UniqueViolation) => AppError::AlreadyRegistered {
                class_name: class_name.clone(),
            },
            _ => {
                error!("Database error inserting enrollment: {}", e);
                AppError::Database(format!("Failed to create class registration: {}", e))
            }
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Student {} registered in class {} ({}/{})",
            student_id,
            class_name,
            enrolled + 1,
            capacity
        );

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        debug!("Deleting enrollment of student {} in class {}", student_id, class_id);

        let row = sqlx::query_as::<sqlx::Postgres, EnrollmentRow>(
            r#"
            DELETE FROM enrollments
            WHERE class_id = $1 AND student_id = $2
            RETURNING id, class_id, student_id, created_at, updated_at
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error deleting enrollment pair: {}", e);
            AppError::Database(format!("Failed to delete class registration: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, FromRow)]
struct EnrollmentRow {
    id: Uuid,
    class_id: Uuid,
    student_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            class_id: row.class_id,
            student_id: row.student_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
