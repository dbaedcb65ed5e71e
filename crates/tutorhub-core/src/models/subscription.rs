//! Subscription model
//!
//! A subscription is a prepaid package of sessions for one student. It is
//! usable while it is active (`end_date` not yet passed) and has balance
//! (`used_sessions < total_sessions`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;

/// Subscription entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    pub id: Uuid,

    /// Student the package belongs to
    pub student_id: Uuid,

    /// Package name (e.g. "Basic 10 sessions")
    pub package_name: String,

    /// First day the package is valid
    pub start_date: DateTime<Utc>,

    /// Last instant the package is valid
    pub end_date: DateTime<Utc>,

    /// Sessions bought
    pub total_sessions: i32,

    /// Sessions consumed so far
    pub used_sessions: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new subscription with no sessions used
    pub fn new(
        student_id: Uuid,
        package_name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        total_sessions: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            student_id,
            package_name: package_name.into(),
            start_date,
            end_date,
            total_sessions,
            used_sessions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active means the end date has not passed yet
    #[inline]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date >= now
    }

    /// At least one session left
    #[inline]
    pub fn has_balance(&self) -> bool {
        self.used_sessions < self.total_sessions
    }

    /// Usable for a new enrollment at `now`
    #[inline]
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active_at(now) && self.has_balance()
    }

    /// Sessions left, never negative
    #[inline]
    pub fn remaining_sessions(&self) -> i32 {
        (self.total_sessions - self.used_sessions).max(0)
    }

    /// Validate required fields and the session-count invariant
    pub fn validate(&self) -> Result<(), String> {
        require_text("package_name", &self.package_name)?;

        if self.total_sessions <= 0 {
            return Err("total_sessions must be greater than zero".to_string());
        }

        if self.used_sessions < 0 {
            return Err("used_sessions cannot be negative".to_string());
        }

        if self.used_sessions > self.total_sessions {
            return Err(format!(
                "used_sessions ({}) cannot exceed total_sessions ({})",
                self.used_sessions, self.total_sessions
            ));
        }

        if self.end_date < self.start_date {
            return Err("end_date cannot be before start_date".to_string());
        }

        Ok(())
    }

    /// Balance figures reported back after a successful registration
    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            subscription_id: self.id,
            package_name: self.package_name.clone(),
            total_sessions: self.total_sessions,
            used_sessions: self.used_sessions,
            remaining_sessions: self.remaining_sessions(),
        }
    }
}

/// Partial change to a stored subscription
///
/// `None` keeps the stored value. The merge happens in the repository against
/// the current row, so a change that leaves `used_sessions` out never rewinds
/// sessions consumed in the meantime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionChanges {
    pub student_id: Option<Uuid>,
    pub package_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_sessions: Option<i32>,
    pub used_sessions: Option<i32>,
}

impl SubscriptionChanges {
    /// Merge onto `subscription`, leaving absent fields untouched
    pub fn apply_to(&self, subscription: &mut Subscription) {
        if let Some(student_id) = self.student_id {
            subscription.student_id = student_id;
        }
        if let Some(package) = &self.package_name {
            subscription.package_name = package.clone();
        }
        if let Some(start) = self.start_date {
            subscription.start_date = start;
        }
        if let Some(end) = self.end_date {
            subscription.end_date = end;
        }
        if let Some(total) = self.total_sessions {
            subscription.total_sessions = total;
        }
        if let Some(used) = self.used_sessions {
            subscription.used_sessions = used;
        }
    }

    /// The stored record with these changes merged and validated
    pub fn merged(&self, current: &Subscription) -> Result<Subscription, String> {
        let mut merged = current.clone();
        self.apply_to(&mut merged);
        merged.validate()?;
        Ok(merged)
    }
}

/// Point-in-time view of a subscription's balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub subscription_id: Uuid,
    pub package_name: String,
    pub total_sessions: i32,
    pub used_sessions: i32,
    pub remaining_sessions: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscription(total: i32, used: i32, ends_in: Duration) -> Subscription {
        let now = Utc::now();
        let mut sub = Subscription::new(
            Uuid::now_v7(),
            "Basic",
            now - Duration::days(30),
            now + ends_in,
            total,
        );
        sub.used_sessions = used;
        sub
    }

    #[test]
    fn test_active_and_balance_are_independent() {
        let now = Utc::now();

        let sub = subscription(10, 9, Duration::days(10));
        assert!(sub.is_active_at(now));
        assert!(sub.has_balance());
        assert!(sub.is_eligible_at(now));
        assert_eq!(sub.remaining_sessions(), 1);

        let exhausted = subscription(10, 10, Duration::days(10));
        assert!(exhausted.is_active_at(now));
        assert!(!exhausted.has_balance());
        assert!(!exhausted.is_eligible_at(now));

        let expired = subscription(10, 0, Duration::days(-1));
        assert!(!expired.is_active_at(now));
        assert!(expired.has_balance());
        assert!(!expired.is_eligible_at(now));
    }

    #[test]
    fn test_end_date_equal_to_now_is_active() {
        let sub = subscription(5, 0, Duration::days(1));
        assert!(sub.is_active_at(sub.end_date));
    }

    #[test]
    fn test_validation() {
        assert!(subscription(10, 0, Duration::days(1)).validate().is_ok());
        assert!(subscription(10, 10, Duration::days(1)).validate().is_ok());
        assert!(subscription(10, 11, Duration::days(1)).validate().is_err());
        assert!(subscription(10, -1, Duration::days(1)).validate().is_err());
        assert!(subscription(0, 0, Duration::days(1)).validate().is_err());
        assert!(subscription(10, 0, Duration::days(-60)).validate().is_err());
    }

    #[test]
    fn test_changes_keep_absent_fields() {
        let mut stored = subscription(10, 3, Duration::days(10));
        let rename = SubscriptionChanges {
            package_name: Some("Renamed".to_string()),
            ..Default::default()
        };

        stored.used_sessions = 4;
        let merged = rename.merged(&stored).unwrap();
        assert_eq!(merged.package_name, "Renamed");
        assert_eq!(merged.used_sessions, 4);
        assert_eq!(merged.total_sessions, 10);

        let shrink = SubscriptionChanges {
            total_sessions: Some(3),
            ..Default::default()
        };
        assert!(shrink.merged(&stored).is_err());
    }

    #[test]
    fn test_snapshot() {
        let sub = subscription(10, 9, Duration::days(10));
        let snap = sub.snapshot();
        assert_eq!(snap.subscription_id, sub.id);
        assert_eq!(snap.package_name, "Basic");
        assert_eq!(snap.total_sessions, 10);
        assert_eq!(snap.used_sessions, 9);
        assert_eq!(snap.remaining_sessions, 1);
    }
}
