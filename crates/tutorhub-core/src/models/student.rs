//! Student model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::require_text;

/// Student gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl Gender {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Student entity
///
/// Every student belongs to exactly one parent. Subscriptions and
/// enrollments point back at the student by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier
    pub id: Uuid,

    /// Full name
    pub name: String,

    /// Date of birth
    pub dob: NaiveDate,

    /// Gender
    pub gender: Gender,

    /// Current school grade label (e.g. "Grade 7")
    pub current_grade: String,

    /// Owning parent
    pub parent_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Create a new student with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        dob: NaiveDate,
        gender: Gender,
        current_grade: impl Into<String>,
        parent_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            dob,
            gender,
            current_grade: current_grade.into(),
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_text("current_grade", &self.current_grade)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!(Gender::from_str("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_str("female"), Some(Gender::Female));
        assert_eq!(Gender::from_str("OTHER"), Some(Gender::Other));
        assert_eq!(Gender::from_str("unknown"), None);
        assert_eq!(Gender::Female.to_string(), "female");
    }

    #[test]
    fn test_student_validation() {
        let dob = NaiveDate::from_ymd_opt(2012, 5, 17).unwrap();
        let mut student = Student::new(
            "Tran Thi B",
            dob,
            Gender::Female,
            "Grade 7",
            Uuid::now_v7(),
        );
        assert!(student.validate().is_ok());

        student.current_grade = String::new();
        assert_eq!(student.validate().unwrap_err(), "current_grade is required");
    }
}
