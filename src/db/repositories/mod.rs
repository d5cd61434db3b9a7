use thiserror::Error;

pub mod announcement;
pub mod attendance;
pub mod group;
pub mod meeting;
pub mod mentee;
pub mod report;
pub mod token;
pub mod user;

/// Business-rule refusals the API reports as 409 Conflict. Anything else
/// coming out of a repository is an infrastructure failure and stays a 500.
#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("{entity} {id} is not in the trash")]
    NotTrashed { entity: &'static str, id: i32 },

    #[error("group {id} still has {meetings} meetings")]
    MeetingsAttached { id: i32, meetings: u64 },

    #[error("mentee {id} not found")]
    MenteeUnavailable { id: i32 },

    #[error("group {id} not found")]
    GroupUnavailable { id: i32 },
}
