//! Parent DTOs

use serde::Deserialize;
use tutorhub_core::models::Parent;
use validator::Validate;

/// Parent creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ParentCreateRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Phone is required"))]
    pub phone: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl ParentCreateRequest {
    pub fn into_parent(self) -> Parent {
        Parent::new(self.name.trim(), self.phone.trim(), self.email.trim())
    }
}

/// Parent update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ParentUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl ParentUpdateRequest {
    /// Merge the provided fields into `parent`
    pub fn apply(self, parent: &mut Parent) {
        if let Some(name) = self.name {
            parent.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            parent.phone = phone.trim().to_string();
        }
        if let Some(email) = self.email {
            parent.email = email.trim().to_string();
        }
    }
}
