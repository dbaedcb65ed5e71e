//! Unified error handling for TutorHub
//!
//! This module provides a single error type covering store failures,
//! validation failures and every enrollment/subscription business rule,
//! with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned to clients for any 500-class failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Store Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    // ==================== Enrollment Rules ====================
    #[error("Student is already registered for class {class_name}")]
    AlreadyRegistered { class_name: String },

    #[error("Student has no active subscription with remaining sessions ({0})")]
    NoActiveSubscription(String),

    #[error(
        "Student already has class {existing_class} on {day_of_week} at {time_slot}; \
         cannot register for class {requested_class} at the same time"
    )]
    ScheduleConflict {
        existing_class: String,
        requested_class: String,
        day_of_week: String,
        time_slot: String,
    },

    #[error("Class {class_name} is full ({enrolled}/{capacity} students)")]
    ClassFull {
        class_name: String,
        enrolled: i64,
        capacity: i32,
    },

    #[error("Student is not registered for this class")]
    NotRegistered,

    // ==================== Subscription Rules ====================
    #[error("Subscription {package_name} has no sessions left ({used}/{total} used)")]
    BalanceExhausted {
        package_name: String,
        used: i32,
        total: i32,
    },

    // ==================== Not Found ====================
    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("Class registration not found: {0}")]
    EnrollmentNotFound(String),

    #[error("{0}")]
    NotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::AlreadyExists(_)
            | AppError::AlreadyRegistered { .. }
            | AppError::NoActiveSubscription(_)
            | AppError::ScheduleConflict { .. }
            | AppError::ClassFull { .. }
            | AppError::BalanceExhausted { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::ParentNotFound(_)
            | AppError::StudentNotFound(_)
            | AppError::ClassNotFound(_)
            | AppError::SubscriptionNotFound(_)
            | AppError::EnrollmentNotFound(_)
            | AppError::NotRegistered
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Transaction(_)
            | AppError::Migration(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Migration(_) => "migration_error",
            AppError::AlreadyRegistered { .. } => "already_registered",
            AppError::NoActiveSubscription(_) => "no_active_subscription",
            AppError::ScheduleConflict { .. } => "schedule_conflict",
            AppError::ClassFull { .. } => "class_full",
            AppError::NotRegistered => "not_registered",
            AppError::BalanceExhausted { .. } => "balance_exhausted",
            AppError::ParentNotFound(_) => "parent_not_found",
            AppError::StudentNotFound(_) => "student_not_found",
            AppError::ClassNotFound(_) => "class_not_found",
            AppError::SubscriptionNotFound(_) => "subscription_not_found",
            AppError::EnrollmentNotFound(_) => "registration_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Store and internal failures are collapsed into a generic message.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), "Request failed: {}", self);
        }

        HttpResponse::build(status).json(json!({
            "error": self.public_message(),
            "code": self.error_code(),
        }))
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_status_codes() {
        assert_eq!(
            AppError::AlreadyRegistered {
                class_name: "Math A".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ClassFull {
                class_name: "Math A".to_string(),
                enrolled: 10,
                capacity: 10
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BalanceExhausted {
                package_name: "Basic".to_string(),
                used: 8,
                total: 8
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotRegistered.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::StudentNotFound("abc".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::NoActiveSubscription("no subscriptions".to_string()).error_code(),
            "no_active_subscription"
        );
        assert_eq!(
            AppError::ScheduleConflict {
                existing_class: "A".to_string(),
                requested_class: "B".to_string(),
                day_of_week: "Monday".to_string(),
                time_slot: "08:00-09:30".to_string(),
            }
            .error_code(),
            "schedule_conflict"
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = AppError::Database("connection refused at 10.0.0.3".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);

        let err = AppError::Validation("name is required".to_string());
        assert_eq!(err.public_message(), "Validation error: name is required");
    }

    #[test]
    fn test_schedule_conflict_message() {
        let err = AppError::ScheduleConflict {
            existing_class: "Physics 7".to_string(),
            requested_class: "Math 7".to_string(),
            day_of_week: "Tuesday".to_string(),
            time_slot: "18:00-19:30".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Physics 7"));
        assert!(msg.contains("Tuesday"));
        assert!(msg.contains("18:00-19:30"));
    }
}
