use async_trait::async_trait;
use tracing::{debug, instrument};
use tutorhub_core::{
    models::Parent,
    traits::{ParentRepository, Repository},
    AppError, AppResult,
};
use uuid::Uuid;

use super::MemoryTable;

/// In-memory implementation of ParentRepository
#[derive(Default)]
pub struct MemoryParentRepository {
    table: MemoryTable<Parent>,
}

impl MemoryParentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn duplicate_email(rows: &[Parent], entity: &Parent) -> AppResult<()> {
        if rows
            .iter()
            .any(|p| p.id != entity.id && p.email == entity.email)
        {
            return Err(AppError::AlreadyExists(format!(
                "Parent with email {} already exists",
                entity.email
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Parent, Uuid> for MemoryParentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Parent>> {
        Ok(self.table.get(id))
    }

    async fn find_all(&self) -> AppResult<Vec<Parent>> {
        Ok(self.table.all())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count_all())
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Parent) -> AppResult<Parent> {
        debug!("Creating parent: {}", entity.email);
        self.table
            .insert_checked(entity, |rows| Self::duplicate_email(rows, entity))
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Parent) -> AppResult<Option<Parent>> {
        self.table
            .update_checked(entity, |rows| Self::duplicate_email(rows, entity))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id))
    }
}

#[async_trait]
impl ParentRepository for MemoryParentRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Parent>> {
        Ok(self.table.find(|p| p.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_email_is_unique() {
        let repo = MemoryParentRepository::new();
        let first = Parent::new("An", "0901", "an@example.com");
        repo.create(&first).await.unwrap();

        let dup = Parent::new("Binh", "0902", "an@example.com");
        let err = repo.create(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        // Re-saving the owner of the email is fine
        let mut renamed = first.clone();
        renamed.name = "An Nguyen".to_string();
        let saved = repo.update(&renamed).await.unwrap().unwrap();
        assert_eq!(saved.name, "An Nguyen");
        assert!(saved.updated_at >= first.updated_at);

        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.find_by_email("an@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = MemoryParentRepository::new();
        let ghost = Parent::new("Ghost", "0", "ghost@example.com");
        assert!(repo.update(&ghost).await.unwrap().is_none());
        assert!(!repo.delete(ghost.id).await.unwrap());
    }
}
