//! In-memory repository implementations
//!
//! Each table is an insertion-ordered `Vec` behind a `parking_lot::RwLock`.
//! Insertion order doubles as creation order because records are stamped
//! when they are built. Compound operations (session consumption,
//! capacity-checked enrollment) run under a single write lock.

mod class;
mod enrollment;
mod parent;
mod student;
mod subscription;
mod table;

pub use class::MemoryClassRepository;
pub use enrollment::MemoryEnrollmentRepository;
pub use parent::MemoryParentRepository;
pub use student::MemoryStudentRepository;
pub use subscription::MemorySubscriptionRepository;

pub(crate) use table::{MemoryTable, Record};
