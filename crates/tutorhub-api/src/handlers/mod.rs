//! HTTP request handlers

pub mod class;
pub mod health;
pub mod parent;
pub mod registration;
pub mod student;
pub mod subscription;

pub use class::configure as configure_classes;
pub use health::configure as configure_health;
pub use parent::configure as configure_parents;
pub use registration::configure as configure_registrations;
pub use student::configure as configure_students;
pub use subscription::configure as configure_subscriptions;
