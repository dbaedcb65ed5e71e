#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc};
use tutorhub_core::models::{Class, Gender, Parent, Student, Subscription};
use tutorhub_core::traits::Repository;
use tutorhub_db::Store;
use uuid::Uuid;

pub async fn seed_student(store: &Store, name: &str) -> Student {
    let parent = Parent::new(
        format!("Parent of {}", name),
        "0900000000",
        format!("{}.{}@example.com", name.to_lowercase(), Uuid::now_v7()),
    );
    store.parents.create(&parent).await.unwrap();

    let dob = NaiveDate::from_ymd_opt(2012, 5, 17).unwrap();
    let student = Student::new(name, dob, Gender::Female, "Grade 7", parent.id);
    store.students.create(&student).await.unwrap()
}

pub async fn seed_class(store: &Store, name: &str, day: &str, slot: &str, capacity: i32) -> Class {
    let class = Class::new(name, "Math", day, slot, "Ms. Lan", capacity);
    store.classes.create(&class).await.unwrap()
}

pub async fn seed_subscription(
    store: &Store,
    student_id: Uuid,
    total: i32,
    used: i32,
    ends_in: Duration,
) -> Subscription {
    let now = Utc::now();
    let mut sub = Subscription::new(
        student_id,
        format!("Package {}", total),
        now - Duration::days(10),
        now + ends_in,
        total,
    );
    sub.used_sessions = used;
    store.subscriptions.create(&sub).await.unwrap()
}
