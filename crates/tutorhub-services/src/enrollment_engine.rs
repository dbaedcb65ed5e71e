//! Enrollment engine
//!
//! Decides whether a student may join a class and commits the enrollment.
//! Registration runs these checks in order, stopping at the first failure:
//!
//! 1. the student exists, then the class exists
//! 2. the student is not already in the class
//! 3. the student holds an active subscription with sessions left
//! 4. no existing class of the student meets on the same day and slot
//! 5. the class has room
//!
//! The final insert re-checks duplicate and capacity atomically in the
//! store, so racing registrations cannot overfill a class. Registration
//! never consumes a session and removal never restores one.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use tutorhub_core::{
    models::{Class, Enrollment, Registration},
    traits::{ClassRepository, EnrollmentRepository, Repository, StudentRepository},
    AppError, AppResult,
};
use tutorhub_db::Store;
use uuid::Uuid;

use crate::subscription_ledger::SubscriptionLedger;

/// Enrollment engine
#[derive(Clone)]
pub struct EnrollmentEngine {
    students: Arc<dyn StudentRepository>,
    classes: Arc<dyn ClassRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    ledger: SubscriptionLedger,
}

impl EnrollmentEngine {
    /// Create an engine over the store's repositories
    pub fn new(store: &Store) -> Self {
        Self {
            students: Arc::clone(&store.students),
            classes: Arc::clone(&store.classes),
            enrollments: Arc::clone(&store.enrollments),
            ledger: SubscriptionLedger::from_store(store),
        }
    }

    /// Register a student to a class
    ///
    /// # Errors
    ///
    /// - `StudentNotFound` / `ClassNotFound` if either id does not resolve
    /// - `AlreadyRegistered` if the pair already exists
    /// - `NoActiveSubscription` if no subscription is both active and has balance
    /// - `ScheduleConflict` if another class of the student shares day and slot
    /// - `ClassFull` if the class is at capacity
    #[instrument(skip(self))]
    pub async fn register_student(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Registration> {
        debug!("Registering student {} to class {}", student_id, class_id);

        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::StudentNotFound(student_id.to_string()))?;

        let class = self.load_class(class_id).await?;

        if self
            .enrollments
            .find_by_pair(class_id, student_id)
            .await?
            .is_some()
        {
            warn!("Student {} already registered in {}", student.name, class.name);
            return Err(AppError::AlreadyRegistered {
                class_name: class.name,
            });
        }

        let subscription = self.ledger.select_for_enrollment(student_id).await?;

        self.check_schedule(&class, student_id).await?;

        let enrolled = self.enrollments.count_by_class(class_id).await?;
        if class.is_full(enrolled) {
            warn!(
                "Class {} is full ({}/{})",
                class.name, enrolled, class.max_students
            );
            return Err(AppError::ClassFull {
                class_name: class.name,
                enrolled,
                capacity: class.max_students,
            });
        }

        let enrollment = self
            .enrollments
            .insert_within_capacity(&class, student_id)
            .await?;

        info!(
            "Student {} registered to class {} using subscription {}",
            student.name, class.name, subscription.package_name
        );

        Ok(Registration {
            enrollment,
            subscription: subscription.snapshot(),
        })
    }

    /// Remove a student from a class
    ///
    /// Checks the class, then the student, then deletes the enrollment.
    /// Fails with `NotRegistered` if the pair has no enrollment.
    #[instrument(skip(self))]
    pub async fn remove_student(&self, class_id: Uuid, student_id: Uuid) -> AppResult<Enrollment> {
        let class = self.load_class(class_id).await?;

        if self.students.find_by_id(student_id).await?.is_none() {
            return Err(AppError::StudentNotFound(student_id.to_string()));
        }

        let removed = self
            .enrollments
            .delete_by_pair(class_id, student_id)
            .await?
            .ok_or(AppError::NotRegistered)?;

        info!("Student {} removed from class {}", student_id, class.name);
        Ok(removed)
    }

    async fn load_class(&self, class_id: Uuid) -> AppResult<Class> {
        self.classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| AppError::ClassNotFound(class_id.to_string()))
    }

    /// Reject the target class if it collides with one the student attends
    ///
    /// Enrollments pointing at deleted classes are skipped.
    async fn check_schedule(&self, target: &Class, student_id: Uuid) -> AppResult<()> {
        for enrollment in self.enrollments.list_by_student(student_id).await? {
            let Some(existing) = self.classes.find_by_id(enrollment.class_id).await? else {
                continue;
            };

            if existing.shares_slot_with(target) {
                warn!(
                    "Schedule conflict between {} and {} on {} {}",
                    existing.name, target.name, target.day_of_week, target.time_slot
                );
                return Err(AppError::ScheduleConflict {
                    existing_class: existing.name,
                    requested_class: target.name.clone(),
                    day_of_week: target.day_of_week.clone(),
                    time_slot: target.time_slot.clone(),
                });
            }
        }
        Ok(())
    }
}
