pub mod gender;
pub mod role;
pub mod status;

pub use gender::Gender;
pub use role::Role;
pub use status::{AttendanceStatus, MeetingType, MenteeStatus};

use thiserror::Error;

/// Returned when a request carries a label no translation rule matches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("nilai '{value}' tidak dikenali untuk {field}")]
pub struct ParseLabelError {
    pub field: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
