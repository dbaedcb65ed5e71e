//! Class DTOs

use serde::Deserialize;
use tutorhub_core::models::Class;
use validator::Validate;

/// Class creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClassCreateRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 50, message = "Day of week is required"))]
    pub day_of_week: String,

    #[validate(length(min = 1, max = 50, message = "Time slot is required"))]
    pub time_slot: String,

    #[validate(length(min = 1, max = 200, message = "Teacher name is required"))]
    pub teacher_name: String,

    #[validate(range(min = 1, message = "max_students must be at least 1"))]
    pub max_students: i32,
}

impl ClassCreateRequest {
    pub fn into_class(self) -> Class {
        Class::new(
            self.name.trim(),
            self.subject.trim(),
            self.day_of_week.trim(),
            self.time_slot.trim(),
            self.teacher_name.trim(),
            self.max_students,
        )
    }
}

/// Class update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClassUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub day_of_week: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub time_slot: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub teacher_name: Option<String>,

    #[validate(range(min = 1, message = "max_students must be at least 1"))]
    pub max_students: Option<i32>,
}

impl ClassUpdateRequest {
    pub fn apply(self, class: &mut Class) {
        if let Some(name) = self.name {
            class.name = name.trim().to_string();
        }
        if let Some(subject) = self.subject {
            class.subject = subject.trim().to_string();
        }
        if let Some(day) = self.day_of_week {
            class.day_of_week = day.trim().to_string();
        }
        if let Some(slot) = self.time_slot {
            class.time_slot = slot.trim().to_string();
        }
        if let Some(teacher) = self.teacher_name {
            class.teacher_name = teacher.trim().to_string();
        }
        if let Some(max) = self.max_students {
            class.max_students = max;
        }
    }
}

/// Filter for listing classes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassFilter {
    pub day: Option<String>,
}
