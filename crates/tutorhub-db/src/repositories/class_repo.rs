//! Class repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use tutorhub_core::{
    models::Class,
    traits::{ClassRepository, Repository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::violation_kind;

/// PostgreSQL implementation of ClassRepository
#[derive(Clone)]
pub struct PgClassRepository {
    pool: PgPool,
}

impl PgClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn write_error(id: Uuid, e: sqlx::Error) -> AppError {
        error!("Database error writing class {}: {}", id, e);
        match violation_kind(&e) {
            Some(ErrorKind::CheckViolation) => {
                AppError::Validation("max_students must be greater than zero".to_string())
            }
            _ => AppError::Database(format!("Failed to write class: {}", e)),
        }
    }
}

#[async_trait]
impl Repository<Class, Uuid> for PgClassRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>> {
        debug!("Finding class by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ClassRow>(
            r#"
            SELECT id, name, subject, day_of_week, time_slot, teacher_name,
                   max_students, created_at, updated_at
            FROM classes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding class {}: {}", id, e);
            AppError::Database(format!("Failed to find class: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Class>> {
        debug!("Listing all classes");

        let rows = sqlx::query_as::<sqlx::Postgres, ClassRow>(
            r#"
            SELECT id, name, subject, day_of_week, time_slot, teacher_name,
                   max_students, created_at, updated_at
            FROM classes
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing classes: {}", e);
            AppError::Database(format!("Failed to list classes: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting classes: {}", e);
                AppError::Database(format!("Failed to count classes: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Class) -> AppResult<Class> {
        debug!("Creating class: {}", entity.name);

        let row = sqlx::query_as::<sqlx::Postgres, ClassRow>(
            r#"
            INSERT INTO classes (
                id, name, subject, day_of_week, time_slot, teacher_name,
                max_students, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, subject, day_of_week, time_slot, teacher_name,
                      max_students, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.subject)
        .bind(&entity.day_of_week)
        .bind(&entity.time_slot)
        .bind(&entity.teacher_name)
        .bind(entity.max_students)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity.id, e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Class) -> AppResult<Option<Class>> {
        debug!("Updating class: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, ClassRow>(
            r#"
            UPDATE classes
            SET name = $2,
                subject = $3,
                day_of_week = $4,
                time_slot = $5,
                teacher_name = $6,
                max_students = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, subject, day_of_week, time_slot, teacher_name,
                      max_students, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.subject)
        .bind(&entity.day_of_week)
        .bind(&entity.time_slot)
        .bind(&entity.teacher_name)
        .bind(entity.max_students)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity.id, e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting class: {}", id);

        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting class {}: {}", id, e);
                AppError::Database(format!("Failed to delete class: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClassRepository for PgClassRepository {
    #[instrument(skip(self))]
    async fn list_by_day(&self, day_of_week: &str) -> AppResult<Vec<Class>> {
        debug!("Listing classes on {}", day_of_week);

        let rows = sqlx::query_as::<sqlx::Postgres, ClassRow>(
            r#"
            SELECT id, name, subject, day_of_week, time_slot, teacher_name,
                   max_students, created_at, updated_at
            FROM classes
            WHERE day_of_week = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(day_of_week)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing classes on {}: {}", day_of_week, e);
            AppError::Database(format!("Failed to list classes: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, FromRow)]
struct ClassRow {
    id: Uuid,
    name: String,
    subject: String,
    day_of_week: String,
    time_slot: String,
    teacher_name: String,
    max_students: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClassRow> for Class {
    fn from(row: ClassRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            subject: row.subject,
            day_of_week: row.day_of_week,
            time_slot: row.time_slot,
            teacher_name: row.teacher_name,
            max_students: row.max_students,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
