//! Domain models for TutorHub
//!
//! This module contains all the core domain models used throughout the application.
//! Records reference each other by identifier only; embedding related records
//! for display is the API layer's job.

pub mod class;
pub mod enrollment;
pub mod parent;
pub mod student;
pub mod subscription;

pub use class::Class;
pub use enrollment::{Enrollment, Registration};
pub use parent::Parent;
pub use student::{Gender, Student};
pub use subscription::{Subscription, SubscriptionChanges, SubscriptionSnapshot};

/// Returns an error message when a required text field is blank
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}
