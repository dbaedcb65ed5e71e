//! Class registration DTOs

use serde::{Deserialize, Serialize};
use tutorhub_core::models::{Class, Enrollment, Student, SubscriptionSnapshot};
use uuid::Uuid;

/// Body of `POST /classregistrations/classes/{class_id}/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStudentRequest {
    pub student_id: Uuid,
}

/// Filter for listing registrations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationFilter {
    pub class_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
}

/// Registration with its class and student embedded
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub class: Option<Class>,
    pub student: Option<Student>,
}

/// Balance figures returned after a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionInfo {
    pub package_name: String,
    pub total_sessions: i32,
    pub used_sessions: i32,
    pub remaining_sessions: i32,
}

impl From<SubscriptionSnapshot> for SubscriptionInfo {
    fn from(snapshot: SubscriptionSnapshot) -> Self {
        Self {
            package_name: snapshot.package_name,
            total_sessions: snapshot.total_sessions,
            used_sessions: snapshot.used_sessions,
            remaining_sessions: snapshot.remaining_sessions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterStudentResponse {
    pub message: String,
    pub registration: RegistrationResponse,
    pub subscription_info: SubscriptionInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveStudentResponse {
    pub message: String,
    pub removed_registration: Enrollment,
}
