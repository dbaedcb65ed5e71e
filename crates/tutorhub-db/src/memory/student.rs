use async_trait::async_trait;
use tutorhub_core::{
    models::Student,
    traits::{Repository, StudentRepository},
    AppResult,
};
use uuid::Uuid;

use super::MemoryTable;

/// In-memory implementation of StudentRepository
#[derive(Default)]
pub struct MemoryStudentRepository {
    table: MemoryTable<Student>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Student, Uuid> for MemoryStudentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        Ok(self.table.get(id))
    }

    async fn find_all(&self) -> AppResult<Vec<Student>> {
        Ok(self.table.all())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count_all())
    }

    async fn create(&self, entity: &Student) -> AppResult<Student> {
        Ok(self.table.insert(entity))
    }

    async fn update(&self, entity: &Student) -> AppResult<Option<Student>> {
        Ok(self.table.update(entity))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id))
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn list_by_parent(&self, parent_id: Uuid) -> AppResult<Vec<Student>> {
        Ok(self.table.filter(|s| s.parent_id == parent_id))
    }
}
