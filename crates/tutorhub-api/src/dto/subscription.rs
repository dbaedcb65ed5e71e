//! Subscription DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutorhub_core::models::{Student, Subscription, SubscriptionChanges};
use uuid::Uuid;
use validator::Validate;

use super::common::{deserialize_datetime, deserialize_optional_datetime};

/// Subscription creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscriptionCreateRequest {
    pub student_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Package name is required"))]
    pub package_name: String,

    #[serde(deserialize_with = "deserialize_datetime")]
    pub start_date: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_datetime")]
    pub end_date: DateTime<Utc>,

    #[validate(range(min = 1, message = "total_sessions must be at least 1"))]
    pub total_sessions: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "used_sessions cannot be negative"))]
    pub used_sessions: i32,
}

impl SubscriptionCreateRequest {
    pub fn into_subscription(self) -> Subscription {
        let mut subscription = Subscription::new(
            self.student_id,
            self.package_name.trim(),
            self.start_date,
            self.end_date,
            self.total_sessions,
        );
        subscription.used_sessions = self.used_sessions;
        subscription
    }
}

/// Subscription update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubscriptionUpdateRequest {
    pub student_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200))]
    pub package_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1))]
    pub total_sessions: Option<i32>,

    #[validate(range(min = 0))]
    pub used_sessions: Option<i32>,
}

impl SubscriptionUpdateRequest {
    /// Only the fields present in the request
    pub fn into_changes(self) -> SubscriptionChanges {
        SubscriptionChanges {
            student_id: self.student_id,
            package_name: self.package_name.map(|p| p.trim().to_string()),
            start_date: self.start_date,
            end_date: self.end_date,
            total_sessions: self.total_sessions,
            used_sessions: self.used_sessions,
        }
    }
}

/// Filter for listing subscriptions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionFilter {
    pub student_id: Option<Uuid>,
}

/// Subscription with its student embedded
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub remaining_sessions: i32,
    pub student: Option<Student>,
}

/// Body of `PATCH /subscriptions/{id}/use`
#[derive(Debug, Clone, Serialize)]
pub struct UseSessionResponse {
    pub message: String,
    pub subscription: SubscriptionResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_plain_dates_and_defaults_used() {
        let body = format!(
            r#"{{"student_id":"{}","package_name":"Basic 10","start_date":"2025-01-01",
                "end_date":"2025-06-30T23:59:59Z","total_sessions":10}}"#,
            Uuid::now_v7()
        );
        let req: SubscriptionCreateRequest = serde_json::from_str(&body).unwrap();
        assert!(req.validate().is_ok());

        let sub = req.into_subscription();
        assert_eq!(sub.used_sessions, 0);
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn test_update_carries_only_present_fields() {
        let req: SubscriptionUpdateRequest =
            serde_json::from_str(r#"{"package_name":"  Renamed  "}"#).unwrap();
        assert!(req.validate().is_ok());

        let changes = req.into_changes();
        assert_eq!(changes.package_name.as_deref(), Some("Renamed"));
        assert_eq!(changes.used_sessions, None);
        assert_eq!(changes.total_sessions, None);

        let now = Utc::now();
        let mut stored = Subscription::new(Uuid::now_v7(), "Basic", now, now, 10);
        stored.used_sessions = 7;
        let merged = changes.merged(&stored).unwrap();
        assert_eq!(merged.used_sessions, 7);
    }

    #[test]
    fn test_merged_update_is_revalidated_by_model() {
        let now = Utc::now();
        let sub = Subscription::new(Uuid::now_v7(), "Basic", now, now, 10);
        let changes = SubscriptionUpdateRequest {
            used_sessions: Some(12),
            ..Default::default()
        }
        .into_changes();
        assert!(changes.merged(&sub).is_err());
    }
}
