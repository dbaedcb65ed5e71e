//! Student repository implementation
//!
//! Provides PostgreSQL-backed storage for student entities.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument, warn};
use tutorhub_core::{
    models::{Gender, Student},
    traits::{Repository, StudentRepository},
    AppError, AppResult,
};
use uuid::Uuid;

const STUDENT_COLUMNS: &str =
    "id, name, dob, gender, current_grade, parent_id, created_at, updated_at";

/// PostgreSQL implementation of StudentRepository
#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    /// Create a new student repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert database gender string to enum
    fn parse_gender(s: &str) -> Gender {
        Gender::from_str(s).unwrap_or_else(|| {
            warn!("Unknown gender '{}' in students table", s);
            Gender::Other
        })
    }
}

#[async_trait]
impl Repository<Student, Uuid> for PgStudentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        debug!("Finding student by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, StudentRow>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding student {}: {}", id, e);
            AppError::Database(format!("Failed to find student: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Student>> {
        debug!("Listing all students");

        let rows = sqlx::query_as::<sqlx::Postgres, StudentRow>(&format!(
            "SELECT {} FROM students ORDER BY created_at, id",
            STUDENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing students: {}", e);
            AppError::Database(format!("Failed to list students: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting students: {}", e);
                AppError::Database(format!("Failed to count students: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Student) -> AppResult<Student> {
        debug!("Creating student: {}", entity.name);

        let row = sqlx::query_as::<sqlx::Postgres, StudentRow>(&format!(
            r#"
            INSERT INTO students (
                id, name, dob, gender, current_grade, parent_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.name)
        .bind(entity.dob)
        .bind(entity.gender.to_string())
        .bind(&entity.current_grade)
        .bind(entity.parent_id)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating student: {}", e);
            AppError::Database(format!("Failed to create student: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Student) -> AppResult<Option<Student>> {
        debug!("Updating student: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, StudentRow>(&format!(
            r#"
            UPDATE students
            SET name = $2,
                dob = $3,
                gender = $4,
                current_grade = $5,
                parent_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.name)
        .bind(entity.dob)
        .bind(entity.gender.to_string())
        .bind(&entity.current_grade)
        .bind(entity.parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating student {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update student: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting student: {}", id);

        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting student {}: {}", id, e);
                AppError::Database(format!("Failed to delete student: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self))]
    async fn list_by_parent(&self, parent_id: Uuid) -> AppResult<Vec<Student>> {
        debug!("Listing students of parent: {}", parent_id);

        let rows = sqlx::query_as::<sqlx::Postgres, StudentRow>(&format!(
            "SELECT {} FROM students WHERE parent_id = $1 ORDER BY created_at, id",
            STUDENT_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing students of parent {}: {}", parent_id, e);
            AppError::Database(format!("Failed to list students: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    dob: NaiveDate,
    gender: String,
    current_grade: String,
    parent_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            dob: row.dob,
            gender: PgStudentRepository::parse_gender(&row.gender),
            current_grade: row.current_grade,
            parent_id: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gender() {
        assert_eq!(PgStudentRepository::parse_gender("male"), Gender::Male);
        assert_eq!(PgStudentRepository::parse_gender("FEMALE"), Gender::Female);
        assert_eq!(PgStudentRepository::parse_gender("?"), Gender::Other);
    }
}
