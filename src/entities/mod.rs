pub mod prelude;

pub mod access_tokens;
pub mod announcements;
pub mod attendances;
pub mod group_histories;
pub mod groups;
pub mod meetings;
pub mod mentees;
pub mod profiles;
pub mod users;
