pub use super::access_tokens::Entity as AccessTokens;
pub use super::announcements::Entity as Announcements;
pub use super::attendances::Entity as Attendances;
pub use super::group_histories::Entity as GroupHistories;
pub use super::groups::Entity as Groups;
pub use super::meetings::Entity as Meetings;
pub use super::mentees::Entity as Mentees;
pub use super::profiles::Entity as Profiles;
pub use super::users::Entity as Users;
