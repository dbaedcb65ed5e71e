//! Student DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tutorhub_core::models::{Gender, Parent, Student};
use uuid::Uuid;
use validator::Validate;

use super::common::{deserialize_date, deserialize_optional_date};

/// Student creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentCreateRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[serde(deserialize_with = "deserialize_date")]
    pub dob: NaiveDate,

    pub gender: String,

    #[validate(length(min = 1, max = 50, message = "Current grade is required"))]
    pub current_grade: String,

    pub parent_id: Uuid,
}

impl StudentCreateRequest {
    pub fn into_student(self) -> Result<Student, String> {
        let gender = parse_gender(&self.gender)?;
        Ok(Student::new(
            self.name.trim(),
            self.dob,
            gender,
            self.current_grade.trim(),
            self.parent_id,
        ))
    }
}

/// Student update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StudentUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub dob: Option<NaiveDate>,

    pub gender: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub current_grade: Option<String>,

    pub parent_id: Option<Uuid>,
}

impl StudentUpdateRequest {
    /// Merge the provided fields into `student`
    pub fn apply(self, student: &mut Student) -> Result<(), String> {
        if let Some(gender) = self.gender {
            student.gender = parse_gender(&gender)?;
        }
        if let Some(name) = self.name {
            student.name = name.trim().to_string();
        }
        if let Some(dob) = self.dob {
            student.dob = dob;
        }
        if let Some(grade) = self.current_grade {
            student.current_grade = grade.trim().to_string();
        }
        if let Some(parent_id) = self.parent_id {
            student.parent_id = parent_id;
        }
        Ok(())
    }
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::from_str(value)
        .ok_or_else(|| format!("gender must be one of male, female, other (got '{}')", value))
}

/// Filter for listing students
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    pub parent_id: Option<Uuid>,
}

/// Student with its parent embedded
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    #[serde(flatten)]
    pub student: Student,
    pub parent: Option<Parent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(gender: &str) -> StudentCreateRequest {
        StudentCreateRequest {
            name: "Tran Thi B".to_string(),
            dob: NaiveDate::from_ymd_opt(2013, 9, 2).unwrap(),
            gender: gender.to_string(),
            current_grade: "Grade 6".to_string(),
            parent_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn test_gender_is_checked() {
        assert!(request("female").into_student().is_ok());
        assert!(request("unknown").into_student().is_err());
    }

    #[test]
    fn test_dob_deserialization() {
        let body = format!(
            r#"{{"name":"B","dob":"2013-09-02","gender":"male","current_grade":"6","parent_id":"{}"}}"#,
            Uuid::now_v7()
        );
        let req: StudentCreateRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.dob, NaiveDate::from_ymd_opt(2013, 9, 2).unwrap());

        let bad = body.replace("2013-09-02", "02/09/2013");
        assert!(serde_json::from_str::<StudentCreateRequest>(&bad).is_err());
    }

    #[test]
    fn test_update_leaves_student_untouched_on_bad_gender() {
        let mut student = request("male").into_student().unwrap();
        let before = student.clone();
        let err = StudentUpdateRequest {
            name: Some("New".to_string()),
            gender: Some("x".to_string()),
            ..Default::default()
        }
        .apply(&mut student);
        assert!(err.is_err());
        assert_eq!(student, before);
    }
}
