//! Enrollment model
//!
//! An enrollment is the registration of one student in one class. At most one
//! enrollment exists per (class, student) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SubscriptionSnapshot;

/// Enrollment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier
    pub id: Uuid,

    /// Class the student is registered in
    pub class_id: Uuid,

    /// Registered student
    pub student_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Create a new enrollment with a fresh identifier
    pub fn new(class_id: Uuid, student_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            class_id,
            student_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this enrollment is for the given pair
    #[inline]
    pub fn matches(&self, class_id: Uuid, student_id: Uuid) -> bool {
        self.class_id == class_id && self.student_id == student_id
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// The committed enrollment
    pub enrollment: Enrollment,

    /// Balance of the subscription that made the student eligible
    pub subscription: SubscriptionSnapshot,
}
