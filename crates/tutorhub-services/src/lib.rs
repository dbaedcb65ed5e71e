//! Business logic services for TutorHub
//!
//! All cross-entity rules live here; the repositories underneath are plain
//! keyed collections.
//!
//! # Services
//!
//! - `SubscriptionLedger` - Session balance queries and atomic consumption
//! - `EnrollmentEngine` - Class registration and removal

pub mod enrollment_engine;
pub mod subscription_ledger;

pub use enrollment_engine::EnrollmentEngine;
pub use subscription_ledger::{Eligibility, SubscriptionLedger};
