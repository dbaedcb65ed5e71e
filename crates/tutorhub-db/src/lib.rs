//! TutorHub Storage Layer
//!
//! This crate provides persistence for the TutorHub system. It includes:
//!
//! - PostgreSQL connection pool management and migrations with sqlx
//! - PostgreSQL repository implementations for all domain entities
//! - In-memory repository implementations with the same guarantees
//! - The `Store` handle that bundles one repository per entity

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod store;

pub use pool::{create_pool, create_pool_from_config, run_migrations};
pub use repositories::*;
pub use store::Store;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use tutorhub_core::{AppError, AppResult};
