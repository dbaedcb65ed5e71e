use async_trait::async_trait;
use tutorhub_core::{
    models::Class,
    traits::{ClassRepository, Repository},
    AppResult,
};
use uuid::Uuid;

use super::MemoryTable;

/// In-memory implementation of ClassRepository
#[derive(Default)]
pub struct MemoryClassRepository {
    table: MemoryTable<Class>,
}

impl MemoryClassRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Class, Uuid> for MemoryClassRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>> {
        Ok(self.table.get(id))
    }

    async fn find_all(&self) -> AppResult<Vec<Class>> {
        Ok(self.table.all())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count_all())
    }

    async fn create(&self, entity: &Class) -> AppResult<Class> {
        Ok(self.table.insert(entity))
    }

    async fn update(&self, entity: &Class) -> AppResult<Option<Class>> {
        Ok(self.table.update(entity))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id))
    }
}

#[async_trait]
impl ClassRepository for MemoryClassRepository {
    async fn list_by_day(&self, day_of_week: &str) -> AppResult<Vec<Class>> {
        Ok(self.table.filter(|c| c.day_of_week == day_of_week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_by_day_keeps_creation_order() {
        let repo = MemoryClassRepository::new();
        let a = Class::new("Math 7A", "Math", "Monday", "18:00-19:30", "Lan", 10);
        let b = Class::new("Physics 8", "Physics", "Tuesday", "18:00-19:30", "Minh", 10);
        let c = Class::new("English 6", "English", "Monday", "08:00-09:30", "Hoa", 10);
        for class in [&a, &b, &c] {
            repo.create(class).await.unwrap();
        }

        let monday: Vec<Uuid> = repo
            .list_by_day("Monday")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(monday, vec![a.id, c.id]);
        assert!(repo.list_by_day("monday").await.unwrap().is_empty());
    }
}
