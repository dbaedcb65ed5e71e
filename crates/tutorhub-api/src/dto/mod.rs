//! Data Transfer Objects (DTOs) for API requests and responses

pub mod class;
pub mod common;
pub mod parent;
pub mod registration;
pub mod student;
pub mod subscription;

pub use class::*;
pub use common::*;
pub use parent::*;
pub use registration::*;
pub use student::*;
pub use subscription::*;
