use async_trait::async_trait;
use tracing::{info, instrument, warn};
use tutorhub_core::{
    models::{Class, Enrollment},
    traits::{EnrollmentRepository, Repository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::MemoryTable;

/// In-memory implementation of EnrollmentRepository
///
/// Capacity comes from the `Class` handed to `insert_within_capacity`; the
/// duplicate check, the count and the push share one write lock.
#[derive(Default)]
pub struct MemoryEnrollmentRepository {
    table: MemoryTable<Enrollment>,
}

impl MemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Enrollment, Uuid> for MemoryEnrollmentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        Ok(self.table.get(id))
    }

    async fn find_all(&self) -> AppResult<Vec<Enrollment>> {
        Ok(self.table.all())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count_all())
    }

    async fn create(&self, entity: &Enrollment) -> AppResult<Enrollment> {
        self.table.insert_checked(entity, |rows| {
            if rows.iter().any(|e| e.matches(entity.class_id, entity.student_id)) {
                return Err(AppError::AlreadyExists(
                    "Student is already registered for this class".to_string(),
                ));
            }
            Ok(())
        })
    }

    async fn update(&self, entity: &Enrollment) -> AppResult<Option<Enrollment>> {
        // The pair itself is immutable; only the timestamp moves.
        Ok(self.table.touch(entity.id))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id))
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryEnrollmentRepository {
    async fn find_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        Ok(self.table.find(|e| e.matches(class_id, student_id)))
    }

    async fn list_by_class(&self, class_id: Uuid) -> AppResult<Vec<Enrollment>> {
        Ok(self.table.filter(|e| e.class_id == class_id))
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        Ok(self.table.filter(|e| e.student_id == student_id))
    }

    async fn count_by_class(&self, class_id: Uuid) -> AppResult<i64> {
        Ok(self.table.count_where(|e| e.class_id == class_id))
    }

    #[instrument(skip(self, class), fields(class_id = %class.id))]
    async fn insert_within_capacity(
        &self,
        class: &Class,
        student_id: Uuid,
    ) -> AppResult<Enrollment> {
        let mut rows = self.table.write();

        if rows.iter().any(|e| e.matches(class.id, student_id)) {
            warn!("Student {} already registered in {}", student_id, class.name);
            return Err(AppError::AlreadyRegistered {
                class_name: class.name.clone(),
            });
        }

        let enrolled = rows.iter().filter(|e| e.class_id == class.id).count() as i64;
        if class.is_full(enrolled) {
            warn!("Class {} is full ({}/{})", class.name, enrolled, class.max_students);
            return Err(AppError::ClassFull {
                class_name: class.name.clone(),
                enrolled,
                capacity: class.max_students,
            });
        }

        let enrollment = Enrollment::new(class.id, student_id);
        rows.push(enrollment.clone());
        info!(
            "Student {} registered in class {} ({}/{})",
            student_id,
            class.name,
            enrolled + 1,
            class.max_students
        );
        Ok(enrollment)
    }

    async fn delete_by_pair(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        Ok(self.table.remove_where(|e| e.matches(class_id, student_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_within_capacity_rules() {
        let repo = MemoryEnrollmentRepository::new();
        let class = Class::new("Math 7A", "Math", "Monday", "18:00-19:30", "Lan", 1);
        let first = Uuid::now_v7();

        repo.insert_within_capacity(&class, first).await.unwrap();

        let err = repo.insert_within_capacity(&class, first).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyRegistered { .. }));

        let err = repo
            .insert_within_capacity(&class, Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ClassFull { enrolled: 1, capacity: 1, .. }));

        assert_eq!(repo.count_by_class(class.id).await.unwrap(), 1);
        assert!(repo.delete_by_pair(class.id, first).await.unwrap().is_some());
        assert!(repo.delete_by_pair(class.id, first).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_respect_capacity() {
        let repo = Arc::new(MemoryEnrollmentRepository::new());
        let class = Class::new("Chem 9", "Chemistry", "Friday", "17:00-18:30", "Tuan", 3);

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let class = class.clone();
                tokio::spawn(async move {
                    repo.insert_within_capacity(&class, Uuid::now_v7()).await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }

        assert_eq!(ok, 3);
        assert_eq!(repo.count_by_class(class.id).await.unwrap(), 3);
    }
}
