//! Parent repository implementation
//!
//! Provides PostgreSQL-backed storage for parent entities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use tutorhub_core::{
    models::Parent,
    traits::{ParentRepository, Repository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::violation_kind;

/// PostgreSQL implementation of ParentRepository
#[derive(Clone)]
pub struct PgParentRepository {
    pool: PgPool,
}

impl PgParentRepository {
    /// Create a new parent repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn write_error(entity: &Parent, e: sqlx::Error) -> AppError {
        error!("Database error writing parent {}: {}", entity.id, e);
        match violation_kind(&e) {
            Some(ErrorKind::UniqueViolation) => AppError::AlreadyExists(format!(
                "Parent with email {} already exists",
                entity.email
            )),
            _ => AppError::Database(format!("Failed to write parent: {}", e)),
        }
    }
}

#[async_trait]
impl Repository<Parent, Uuid> for PgParentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Parent>> {
        debug!("Finding parent by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ParentRow>(
            r#"
            SELECT id, name, phone, email, created_at, updated_at
            FROM parents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding parent {}: {}", id, e);
            AppError::Database(format!("Failed to find parent: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Parent>> {
        debug!("Listing all parents");

        let rows = sqlx::query_as::<sqlx::Postgres, ParentRow>(
            r#"
            SELECT id, name, phone, email, created_at, updated_at
            FROM parents
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing parents: {}", e);
            AppError::Database(format!("Failed to list parents: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM parents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting parents: {}", e);
                AppError::Database(format!("Failed to count parents: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Parent) -> AppResult<Parent> {
        debug!("Creating parent: {}", entity.email);

        let row = sqlx::query_as::<sqlx::Postgres, ParentRow>(
            r#"
            INSERT INTO parents (id, name, phone, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, phone, email, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.phone)
        .bind(&entity.email)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity, e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Parent) -> AppResult<Option<Parent>> {
        debug!("Updating parent: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, ParentRow>(
            r#"
            UPDATE parents
            SET name = $2,
                phone = $3,
                email = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, phone, email, created_at, updated_at
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.phone)
        .bind(&entity.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(entity, e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting parent: {}", id);

        let result = sqlx::query("DELETE FROM parents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting parent {}: {}", id, e);
                AppError::Database(format!("Failed to delete parent: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ParentRepository for PgParentRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Parent>> {
        debug!("Finding parent by email: {}", email);

        let result = sqlx::query_as::<sqlx::Postgres, ParentRow>(
            r#"
            SELECT id, name, phone, email, created_at, updated_at
            FROM parents
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding parent by email: {}", e);
            AppError::Database(format!("Failed to find parent: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, FromRow)]
struct ParentRow {
    id: Uuid,
    name: String,
    phone: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ParentRow> for Parent {
    fn from(row: ParentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
