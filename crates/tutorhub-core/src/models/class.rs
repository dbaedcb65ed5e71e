//! Class model
//!
//! A class meets once a week. `day_of_week` and `time_slot` are free-form
//! labels; two classes collide only when both labels are exactly equal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;

/// Class entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Unique identifier
    pub id: Uuid,

    /// Display name (e.g. "Math 7A")
    pub name: String,

    /// Subject taught
    pub subject: String,

    /// Day-of-week label (e.g. "Monday")
    pub day_of_week: String,

    /// Time-slot label (e.g. "18:00-19:30")
    pub time_slot: String,

    /// Teacher's name
    pub teacher_name: String,

    /// Maximum number of enrolled students
    pub max_students: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Create a new class with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        day_of_week: impl Into<String>,
        time_slot: impl Into<String>,
        teacher_name: impl Into<String>,
        max_students: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            subject: subject.into(),
            day_of_week: day_of_week.into(),
            time_slot: time_slot.into(),
            teacher_name: teacher_name.into(),
            max_students,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether both classes meet on the same day label and time-slot label
    #[inline]
    pub fn shares_slot_with(&self, other: &Class) -> bool {
        self.day_of_week == other.day_of_week && self.time_slot == other.time_slot
    }

    /// Whether `enrolled` students leave no room for another
    #[inline]
    pub fn is_full(&self, enrolled: i64) -> bool {
        enrolled >= i64::from(self.max_students)
    }

    /// Validate required fields and capacity
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_text("subject", &self.subject)?;
        require_text("day_of_week", &self.day_of_week)?;
        require_text("time_slot", &self.time_slot)?;
        require_text("teacher_name", &self.teacher_name)?;

        if self.max_students <= 0 {
            return Err("max_students must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(day: &str, slot: &str) -> Class {
        Class::new("Math 7A", "Math", day, slot, "Ms. Lan", 2)
    }

    #[test]
    fn test_slot_match_is_exact() {
        let a = class("Monday", "18:00-19:30");
        assert!(a.shares_slot_with(&class("Monday", "18:00-19:30")));
        assert!(!a.shares_slot_with(&class("monday", "18:00-19:30")));
        assert!(!a.shares_slot_with(&class("Monday", "18:00-19:00")));
        assert!(!a.shares_slot_with(&class("Tuesday", "18:00-19:30")));
    }

    #[test]
    fn test_capacity() {
        let a = class("Monday", "18:00-19:30");
        assert!(!a.is_full(0));
        assert!(!a.is_full(1));
        assert!(a.is_full(2));
        assert!(a.is_full(3));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut a = class("Monday", "18:00-19:30");
        a.max_students = 0;
        assert!(a.validate().is_err());
    }
}
