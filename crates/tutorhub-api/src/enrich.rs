//! Embedding of referenced records for API responses
//!
//! Core operations return identifiers only. Handlers call these helpers to
//! attach the referenced parent, student or class; a reference that no longer
//! resolves is rendered as `null`.

use futures::future::try_join_all;
use tutorhub_core::models::{Enrollment, Student, Subscription};
use tutorhub_core::traits::Repository;
use tutorhub_core::AppResult;
use tutorhub_db::Store;

use crate::dto::{RegistrationResponse, StudentResponse, SubscriptionResponse};

pub async fn student(store: &Store, student: Student) -> AppResult<StudentResponse> {
    let parent = store.parents.find_by_id(student.parent_id).await?;
    Ok(StudentResponse { student, parent })
}

pub async fn students(store: &Store, students: Vec<Student>) -> AppResult<Vec<StudentResponse>> {
    try_join_all(students.into_iter().map(|s| student(store, s))).await
}

pub async fn subscription(
    store: &Store,
    subscription: Subscription,
) -> AppResult<SubscriptionResponse> {
    let student = store.students.find_by_id(subscription.student_id).await?;
    Ok(SubscriptionResponse {
        remaining_sessions: subscription.remaining_sessions(),
        subscription,
        student,
    })
}

pub async fn subscriptions(
    store: &Store,
    subscriptions: Vec<Subscription>,
) -> AppResult<Vec<SubscriptionResponse>> {
    try_join_all(subscriptions.into_iter().map(|s| subscription(store, s))).await
}

pub async fn registration(
    store: &Store,
    enrollment: Enrollment,
) -> AppResult<RegistrationResponse> {
    let class = store.classes.find_by_id(enrollment.class_id).await?;
    let student = store.students.find_by_id(enrollment.student_id).await?;
    Ok(RegistrationResponse {
        enrollment,
        class,
        student,
    })
}

pub async fn registrations(
    store: &Store,
    enrollments: Vec<Enrollment>,
) -> AppResult<Vec<RegistrationResponse>> {
    try_join_all(enrollments.into_iter().map(|e| registration(store, e))).await
}
