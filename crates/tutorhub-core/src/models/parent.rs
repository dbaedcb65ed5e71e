//! Parent model
//!
//! Parents own zero or more students. Email addresses are unique across parents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;

/// Parent entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    /// Unique identifier
    pub id: Uuid,

    /// Full name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email (unique)
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Parent {
    /// Create a new parent with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_text("phone", &self.phone)?;
        require_text("email", &self.email)?;

        if !self.email.contains('@') {
            return Err(format!("email '{}' is not a valid address", self.email));
        }

        Ok(())
    }
}
