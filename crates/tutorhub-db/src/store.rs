//! Store handle
//!
//! Bundles one repository per entity behind trait objects so services and
//! handlers are written once against either backend. Cloning is cheap.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use tutorhub_core::config::{DatabaseConfig, StorageBackend};
use tutorhub_core::traits::{
    ClassRepository, EnrollmentRepository, ParentRepository, StudentRepository,
    SubscriptionRepository,
};
use tutorhub_core::AppResult;

use crate::memory::{
    MemoryClassRepository, MemoryEnrollmentRepository, MemoryParentRepository,
    MemoryStudentRepository, MemorySubscriptionRepository,
};
use crate::pool::{create_pool_from_config, run_migrations};
use crate::repositories::{
    PgClassRepository, PgEnrollmentRepository, PgParentRepository, PgStudentRepository,
    PgSubscriptionRepository,
};

#[derive(Clone)]
pub struct Store {
    pub parents: Arc<dyn ParentRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub classes: Arc<dyn ClassRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pool: Option<PgPool>,
}

impl Store {
    /// Store backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            parents: Arc::new(PgParentRepository::new(pool.clone())),
            students: Arc::new(PgStudentRepository::new(pool.clone())),
            classes: Arc::new(PgClassRepository::new(pool.clone())),
            subscriptions: Arc::new(PgSubscriptionRepository::new(pool.clone())),
            enrollments: Arc::new(PgEnrollmentRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Empty process-local store
    pub fn in_memory() -> Self {
        Self {
            parents: Arc::new(MemoryParentRepository::new()),
            students: Arc::new(MemoryStudentRepository::new()),
            classes: Arc::new(MemoryClassRepository::new()),
            subscriptions: Arc::new(MemorySubscriptionRepository::new()),
            enrollments: Arc::new(MemoryEnrollmentRepository::new()),
            pool: None,
        }
    }

    /// Open the backend selected in the database configuration
    ///
    /// For PostgreSQL this connects the pool and, if enabled, applies
    /// pending migrations before returning.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory store; data will not survive a restart");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let pool = create_pool_from_config(config).await?;
                if config.run_migrations {
                    run_migrations(&pool).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Name of the active backend
    pub fn backend(&self) -> StorageBackend {
        if self.pool.is_some() {
            StorageBackend::Postgres
        } else {
            StorageBackend::Memory
        }
    }

    /// Release backend resources
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            info!("Closing database pool");
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorhub_core::models::Parent;
    use tutorhub_core::traits::Repository;

    #[tokio::test]
    async fn test_in_memory_store_is_shared_between_clones() {
        let store = Store::in_memory();
        let clone = store.clone();
        assert_eq!(store.backend(), StorageBackend::Memory);

        let parent = Parent::new("Mai", "0903", "mai@example.com");
        store.parents.create(&parent).await.unwrap();
        assert_eq!(clone.parents.count().await.unwrap(), 1);

        store.close().await;
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let config = DatabaseConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let store = Store::from_config(&config).await.unwrap();
        assert_eq!(store.backend(), StorageBackend::Memory);
    }
}
