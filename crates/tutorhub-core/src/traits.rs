//! Common traits for repositories
//!
//! Defines the persistence seams the business services are written against.
//! Repositories hold no cross-entity rules; those live in the services crate.

use crate::error::AppError;
use crate::models::{Class, Enrollment, Parent, Student, Subscription, SubscriptionChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generic repository trait for CRUD operations
///
/// Listing returns records in a stable creation order.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity, returning `None` if it does not exist
    async fn update(&self, entity: &T) -> Result<Option<T>, AppError>;

    /// Delete entity by ID, returning whether it existed
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Parent repository
#[async_trait]
pub trait ParentRepository: Repository<Parent, Uuid> {
    /// Find parent by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<Parent>, AppError>;
}

/// Student repository
#[async_trait]
pub trait StudentRepository: Repository<Student, Uuid> {
    /// List the students owned by a parent
    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<Student>, AppError>;
}

/// Class repository
#[async_trait]
pub trait ClassRepository: Repository<Class, Uuid> {
    /// List classes meeting on the given day label
    async fn list_by_day(&self, day_of_week: &str) -> Result<Vec<Class>, AppError>;
}

/// Subscription repository
#[async_trait]
pub trait SubscriptionRepository: Repository<Subscription, Uuid> {
    /// List all subscriptions of a student
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Subscription>, AppError>;

    /// Subscriptions of a student with `end_date >= now` and
    /// `used_sessions < total_sessions`, in creation order
    async fn find_active_with_balance(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, AppError>;

    /// Atomically increment `used_sessions` by one
    ///
    /// Fails with `SubscriptionNotFound` if the identifier does not resolve
    /// and `BalanceExhausted` if no session is left. Concurrent calls on the
    /// same subscription never push `used_sessions` past `total_sessions`.
    async fn consume_session(&self, id: Uuid) -> Result<Subscription, AppError>;

    /// Merge `changes` onto the current row and store the validated result
    ///
    /// Read, merge and write are serialized with `consume_session`, so fields
    /// absent from `changes` keep their latest value. Returns `None` if the
    /// subscription does not exist and `Validation` if the merged record
    /// breaks an invariant.
    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
    ) -> Result<Option<Subscription>, AppError>;
}

/// Enrollment repository
#[async_trait]
pub trait EnrollmentRepository: Repository<Enrollment, Uuid> {
    /// Find the enrollment for a (class, student) pair
    async fn find_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>;

    /// List enrollments of a class
    async fn list_by_class(&self, class_id: Uuid) -> Result<Vec<Enrollment>, AppError>;

    /// List enrollments of a student
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Enrollment>, AppError>;

    /// Count enrollments of a class
    async fn count_by_class(&self, class_id: Uuid) -> Result<i64, AppError>;

    /// Insert an enrollment only if the pair is new and the class has room
    ///
    /// The duplicate and capacity checks and the insert happen as one atomic
    /// step with respect to other inserts for the same class. Fails with
    /// `AlreadyRegistered` or `ClassFull`.
    async fn insert_within_capacity(
        &self,
        class: &Class,
        student_id: Uuid,
    ) -> Result<Enrollment, AppError>;

    /// Delete the enrollment for a (class, student) pair, returning it
    async fn delete_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>;
}
