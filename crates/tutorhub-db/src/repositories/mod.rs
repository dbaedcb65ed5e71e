//! Repository implementations
//!
//! This module contains the PostgreSQL implementations of the repository
//! traits defined in tutorhub-core, using sqlx.

pub mod class_repo;
pub mod enrollment_repo;
pub mod parent_repo;
pub mod student_repo;
pub mod subscription_repo;

pub use class_repo::PgClassRepository;
pub use enrollment_repo::PgEnrollmentRepository;
pub use parent_repo::PgParentRepository;
pub use student_repo::PgStudentRepository;
pub use subscription_repo::PgSubscriptionRepository;

use sqlx::error::ErrorKind;

/// Classify a sqlx error by the constraint kind it violated, if any
pub(crate) fn violation_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    err.as_database_error().map(|db| db.kind())
}
