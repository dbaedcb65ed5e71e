//! Registration and removal rules against the in-memory store

mod common;

use chrono::Duration;
use common::{seed_class, seed_student, seed_subscription};
use futures::future::join_all;
use tutorhub_core::traits::{EnrollmentRepository, Repository, SubscriptionRepository};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use tutorhub_services::EnrollmentEngine;
use uuid::Uuid;

#[tokio::test]
async fn test_register_reports_remaining_sessions_then_class_full() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Linh").await;
    seed_subscription(&store, s.id, 10, 9, Duration::days(30)).await;
    let c = seed_class(&store, "Math 7A", "Monday", "18:00-19:30", 1).await;

    let registration = engine.register_student(c.id, s.id).await.unwrap();
    assert_eq!(registration.enrollment.class_id, c.id);
    assert_eq!(registration.enrollment.student_id, s.id);
    assert_eq!(registration.subscription.remaining_sessions, 1);
    assert_eq!(registration.subscription.used_sessions, 9);

    let t = seed_student(&store, "Tuan").await;
    seed_subscription(&store, t.id, 10, 0, Duration::days(30)).await;
    let err = engine.register_student(c.id, t.id).await.unwrap_err();
    assert!(matches!(err, AppError::ClassFull { enrolled: 1, capacity: 1, .. }));
}

#[tokio::test]
async fn test_registration_does_not_consume_sessions() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Ha").await;
    let sub = seed_subscription(&store, s.id, 4, 1, Duration::days(30)).await;
    let c = seed_class(&store, "English 6", "Friday", "17:00-18:30", 5).await;

    engine.register_student(c.id, s.id).await.unwrap();
    let stored = store.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(stored.used_sessions, 1);
}

#[tokio::test]
async fn test_missing_student_is_checked_before_class() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let err = engine
        .register_student(Uuid::now_v7(), Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StudentNotFound(_)));

    let s = seed_student(&store, "Nam").await;
    let err = engine
        .register_student(Uuid::now_v7(), s.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ClassNotFound(_)));
}

#[tokio::test]
async fn test_second_registration_is_already_registered() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Mai").await;
    seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
    let c = seed_class(&store, "Physics 8", "Tuesday", "18:00-19:30", 10).await;

    engine.register_student(c.id, s.id).await.unwrap();
    let err = engine.register_student(c.id, s.id).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyRegistered { .. }));
    assert_eq!(store.enrollments.count_by_class(c.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_no_usable_subscription() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);
    let c = seed_class(&store, "Math 7A", "Monday", "18:00-19:30", 10).await;

    let none = seed_student(&store, "An").await;
    let err = engine.register_student(c.id, none.id).await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSubscription(_)));

    // Active but exhausted
    let exhausted = seed_student(&store, "Binh").await;
    seed_subscription(&store, exhausted.id, 8, 8, Duration::days(30)).await;
    let err = engine.register_student(c.id, exhausted.id).await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSubscription(_)));

    // Balance left but expired
    let expired = seed_student(&store, "Chi").await;
    seed_subscription(&store, expired.id, 8, 0, Duration::days(-1)).await;
    let err = engine.register_student(c.id, expired.id).await.unwrap_err();
    match err {
        AppError::NoActiveSubscription(detail) => assert!(detail.contains("0 active")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_first_usable_subscription_in_creation_order_is_reported() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Dung").await;
    seed_subscription(&store, s.id, 5, 5, Duration::days(30)).await;
    let first_usable = seed_subscription(&store, s.id, 12, 3, Duration::days(60)).await;
    seed_subscription(&store, s.id, 20, 0, Duration::days(90)).await;
    let c = seed_class(&store, "Chem 9", "Saturday", "08:00-09:30", 10).await;

    let registration = engine.register_student(c.id, s.id).await.unwrap();
    assert_eq!(registration.subscription.subscription_id, first_usable.id);
    assert_eq!(registration.subscription.remaining_sessions, 9);
}

#[tokio::test]
async fn test_schedule_conflict_requires_exact_day_and_slot() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Giang").await;
    seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
    let physics = seed_class(&store, "Physics 7", "Tuesday", "18:00-19:30", 10).await;
    let math = seed_class(&store, "Math 7", "Tuesday", "18:00-19:30", 10).await;
    let other_slot = seed_class(&store, "Math 7B", "Tuesday", "18:00-19:00", 10).await;
    let other_day = seed_class(&store, "Math 7C", "Wednesday", "18:00-19:30", 10).await;

    engine.register_student(physics.id, s.id).await.unwrap();

    let err = engine.register_student(math.id, s.id).await.unwrap_err();
    match err {
        AppError::ScheduleConflict {
            existing_class,
            requested_class,
            ..
        } => {
            assert_eq!(existing_class, "Physics 7");
            assert_eq!(requested_class, "Math 7");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    engine.register_student(other_slot.id, s.id).await.unwrap();
    engine.register_student(other_day.id, s.id).await.unwrap();
}

#[tokio::test]
async fn test_enrollment_of_deleted_class_does_not_conflict() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Hieu").await;
    seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
    let old = seed_class(&store, "Old", "Monday", "08:00-09:30", 10).await;
    let new = seed_class(&store, "New", "Monday", "08:00-09:30", 10).await;

    engine.register_student(old.id, s.id).await.unwrap();
    store.classes.delete(old.id).await.unwrap();

    engine.register_student(new.id, s.id).await.unwrap();
}

#[tokio::test]
async fn test_remove_student() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let s = seed_student(&store, "Khoa").await;
    let sub = seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
    let c = seed_class(&store, "Math 7A", "Monday", "18:00-19:30", 10).await;

    let err = engine.remove_student(c.id, s.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotRegistered));

    let registration = engine.register_student(c.id, s.id).await.unwrap();
    store.subscriptions.consume_session(sub.id).await.unwrap();

    let removed = engine.remove_student(c.id, s.id).await.unwrap();
    assert_eq!(removed.id, registration.enrollment.id);

    // Removal never gives the session back
    let stored = store.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(stored.used_sessions, 1);

    let err = engine.remove_student(c.id, s.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotRegistered));
}

#[tokio::test]
async fn test_remove_checks_class_then_student() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);

    let err = engine
        .remove_student(Uuid::now_v7(), Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ClassNotFound(_)));

    let c = seed_class(&store, "Math 7A", "Monday", "18:00-19:30", 10).await;
    let err = engine
        .remove_student(c.id, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StudentNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_capacity() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);
    let c = seed_class(&store, "Popular", "Sunday", "09:00-10:30", 3).await;

    let mut students = Vec::new();
    for i in 0..10 {
        let s = seed_student(&store, &format!("S{}", i)).await;
        seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
        students.push(s.id);
    }

    let class_id = c.id;
    let attempts = students.iter().map(|&student_id| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.register_student(class_id, student_id).await })
    });
    let results = join_all(attempts).await;

    let ok = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(ok, 3);
    assert_eq!(store.enrollments.count_by_class(c.id).await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_registrations_leave_one_enrollment() {
    let store = Store::in_memory();
    let engine = EnrollmentEngine::new(&store);
    let s = seed_student(&store, "Quang").await;
    seed_subscription(&store, s.id, 10, 0, Duration::days(30)).await;
    let c = seed_class(&store, "Math 7A", "Monday", "18:00-19:30", 10).await;

    let (class_id, student_id) = (c.id, s.id);
    let attempts = (0..8).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.register_student(class_id, student_id).await })
    });
    let results = join_all(attempts).await;

    let ok = results.into_iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(ok, 1);
    assert!(store.enrollments.find_by_pair(c.id, s.id).await.unwrap().is_some());
    assert_eq!(store.enrollments.count_by_class(c.id).await.unwrap(), 1);
}
