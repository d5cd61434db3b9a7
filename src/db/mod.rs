use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{announcements, groups, meetings, mentees, profiles, users};
use crate::models::Role;

pub mod migrator;
pub mod repositories;

pub use repositories::ConflictError;
pub use repositories::announcement::AnnouncementInput;
pub use repositories::attendance::{AttendanceEntry, AttendanceStats};
pub use repositories::group::{GroupDeleteInfo, GroupInput};
pub use repositories::meeting::MeetingInput;
pub use repositories::mentee::MenteeInput;
pub use repositories::report::GroupMonthlyReport;
pub use repositories::user::{AuthOutcome, ProfileInput, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn mentee_repo(&self) -> repositories::mentee::MenteeRepository {
        repositories::mentee::MenteeRepository::new(self.conn.clone())
    }

    fn group_repo(&self) -> repositories::group::GroupRepository {
        repositories::group::GroupRepository::new(self.conn.clone())
    }

    fn meeting_repo(&self) -> repositories::meeting::MeetingRepository {
        repositories::meeting::MeetingRepository::new(self.conn.clone())
    }

    fn attendance_repo(&self) -> repositories::attendance::AttendanceRepository {
        repositories::attendance::AttendanceRepository::new(self.conn.clone())
    }

    fn announcement_repo(&self) -> repositories::announcement::AnnouncementRepository {
        repositories::announcement::AnnouncementRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    // --- users & auth ---

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        self.user_repo().authenticate(email, password).await
    }

    pub async fn issue_token(&self, user_id: i32) -> Result<String> {
        self.token_repo().issue(user_id).await
    }

    pub async fn verify_token(&self, token: &str) -> Result<Option<users::Model>> {
        self.token_repo().verify(token).await
    }

    pub async fn revoke_token(&self, token: &str) -> Result<bool> {
        self.token_repo().revoke(token).await
    }

    pub async fn revoke_all_tokens(&self, user_id: i32) -> Result<u64> {
        self.token_repo().revoke_all(user_id).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users_by_role(
        &self,
        role: Role,
    ) -> Result<Vec<(User, Option<profiles::Model>)>> {
        self.user_repo().list_by_role(role).await
    }

    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().email_taken(email, exclude_id).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(email, password, role, security).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        email: &str,
        new_password: Option<&str>,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update(id, email, new_password, security)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn block_user(&self, id: i32, blocked_by: i32) -> Result<Option<User>> {
        self.user_repo().block(id, blocked_by).await
    }

    pub async fn unblock_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().unblock(id).await
    }

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<profiles::Model>> {
        self.user_repo().get_profile(user_id).await
    }

    pub async fn upsert_profile(&self, input: ProfileInput) -> Result<profiles::Model> {
        self.user_repo().upsert_profile(input).await
    }

    pub async fn set_profile_picture(&self, user_id: i32, path: &str) -> Result<bool> {
        self.user_repo().set_profile_picture(user_id, path).await
    }

    // --- mentees ---

    pub async fn list_mentees(&self) -> Result<Vec<(mentees::Model, Option<groups::Model>)>> {
        self.mentee_repo().list().await
    }

    pub async fn list_available_mentees(&self) -> Result<Vec<mentees::Model>> {
        self.mentee_repo().list_available().await
    }

    pub async fn get_mentee(
        &self,
        id: i32,
    ) -> Result<Option<(mentees::Model, Option<groups::Model>)>> {
        self.mentee_repo().get(id).await
    }

    pub async fn create_mentee(&self, input: MenteeInput) -> Result<mentees::Model> {
        self.mentee_repo().create(input).await
    }

    pub async fn update_mentee(
        &self,
        id: i32,
        input: MenteeInput,
    ) -> Result<Option<mentees::Model>> {
        self.mentee_repo().update(id, input).await
    }

    pub async fn delete_mentee(&self, id: i32) -> Result<bool> {
        self.mentee_repo().soft_delete(id).await
    }

    pub async fn list_trashed_mentees(&self) -> Result<Vec<mentees::Model>> {
        self.mentee_repo().list_trashed().await
    }

    pub async fn restore_mentee(&self, id: i32) -> Result<bool> {
        self.mentee_repo().restore(id).await
    }

    pub async fn force_delete_mentee(&self, id: i32) -> Result<bool> {
        self.mentee_repo().force_delete(id).await
    }

    // --- groups & membership ---

    pub async fn list_groups(&self) -> Result<Vec<(groups::Model, Option<users::Model>)>> {
        self.group_repo().list().await
    }

    pub async fn list_groups_by_mentor(&self, mentor_id: i32) -> Result<Vec<groups::Model>> {
        self.group_repo().list_by_mentor(mentor_id).await
    }

    pub async fn get_group(
        &self,
        id: i32,
    ) -> Result<Option<(groups::Model, Option<users::Model>)>> {
        self.group_repo().get(id).await
    }

    pub async fn group_members(&self, group_id: i32) -> Result<Vec<mentees::Model>> {
        self.group_repo().members(group_id).await
    }

    pub async fn create_group(&self, input: GroupInput) -> Result<groups::Model> {
        self.group_repo().create(input).await
    }

    pub async fn update_group(&self, id: i32, input: GroupInput) -> Result<Option<groups::Model>> {
        self.group_repo().update(id, input).await
    }

    pub async fn move_mentee(
        &self,
        mentee_id: i32,
        to_group_id: Option<i32>,
        moved_by: i32,
    ) -> Result<mentees::Model> {
        self.group_repo()
            .move_mentee(mentee_id, to_group_id, moved_by)
            .await
    }

    pub async fn move_mentees(
        &self,
        mentee_ids: &[i32],
        to_group_id: i32,
        moved_by: i32,
    ) -> Result<u64> {
        self.group_repo()
            .move_mentees(mentee_ids, to_group_id, moved_by)
            .await
    }

    pub async fn group_delete_info(&self, id: i32) -> Result<Option<GroupDeleteInfo>> {
        self.group_repo().delete_info(id).await
    }

    pub async fn delete_group(&self, id: i32, deleted_by: i32) -> Result<bool> {
        self.group_repo().soft_delete(id, deleted_by).await
    }

    pub async fn bulk_delete_groups(&self, ids: &[i32], deleted_by: i32) -> Result<u64> {
        self.group_repo().bulk_delete(ids, deleted_by).await
    }

    pub async fn list_trashed_groups(&self) -> Result<Vec<(groups::Model, Option<users::Model>)>> {
        self.group_repo().list_trashed().await
    }

    pub async fn restore_group(&self, id: i32) -> Result<bool> {
        self.group_repo().restore(id).await
    }

    pub async fn force_delete_group(&self, id: i32) -> Result<bool> {
        self.group_repo().force_delete(id).await
    }

    // --- meetings & attendance ---

    pub async fn list_meetings(&self) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        self.meeting_repo().list().await
    }

    pub async fn list_meetings_by_mentor(
        &self,
        mentor_id: i32,
    ) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        self.meeting_repo().list_by_mentor(mentor_id).await
    }

    pub async fn get_meeting(
        &self,
        id: i32,
    ) -> Result<Option<(meetings::Model, Option<groups::Model>)>> {
        self.meeting_repo().get(id).await
    }

    pub async fn create_meeting(&self, input: MeetingInput) -> Result<meetings::Model> {
        self.meeting_repo().create(input).await
    }

    pub async fn update_meeting(
        &self,
        id: i32,
        input: MeetingInput,
    ) -> Result<Option<meetings::Model>> {
        self.meeting_repo().update(id, input).await
    }

    pub async fn delete_meeting(&self, id: i32) -> Result<bool> {
        self.meeting_repo().soft_delete(id).await
    }

    pub async fn list_trashed_meetings(
        &self,
    ) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        self.meeting_repo().list_trashed().await
    }

    pub async fn restore_meeting(&self, id: i32) -> Result<bool> {
        self.meeting_repo().restore(id).await
    }

    pub async fn force_delete_meeting(&self, id: i32) -> Result<bool> {
        self.meeting_repo().force_delete(id).await
    }

    pub async fn list_attendances(
        &self,
        meeting_id: i32,
    ) -> Result<Vec<(crate::entities::attendances::Model, Option<mentees::Model>)>> {
        self.attendance_repo().list_for_meeting(meeting_id).await
    }

    pub async fn record_attendances(
        &self,
        meeting_id: i32,
        entries: &[AttendanceEntry],
    ) -> Result<u64> {
        self.attendance_repo().record_many(meeting_id, entries).await
    }

    pub async fn meeting_attendance_stats(&self, meeting_id: i32) -> Result<AttendanceStats> {
        self.attendance_repo().stats_for_meeting(meeting_id).await
    }

    pub async fn mentee_attendance_stats(&self, mentee_id: i32) -> Result<AttendanceStats> {
        self.attendance_repo().stats_for_mentee(mentee_id).await
    }

    pub async fn group_attendance_stats(&self, group_id: i32) -> Result<AttendanceStats> {
        self.attendance_repo().stats_for_group(group_id).await
    }

    pub async fn overall_attendance_stats(&self, meeting_ids: &[i32]) -> Result<AttendanceStats> {
        self.attendance_repo().stats_for_meetings(meeting_ids).await
    }

    // --- announcements ---

    pub async fn list_announcements(&self) -> Result<Vec<announcements::Model>> {
        self.announcement_repo().list().await
    }

    pub async fn list_archived_announcements(&self) -> Result<Vec<announcements::Model>> {
        self.announcement_repo().list_archived().await
    }

    pub async fn get_announcement(&self, id: i32) -> Result<Option<announcements::Model>> {
        self.announcement_repo().get(id).await
    }

    pub async fn create_announcement(
        &self,
        input: AnnouncementInput,
    ) -> Result<announcements::Model> {
        self.announcement_repo().create(input).await
    }

    pub async fn update_announcement(
        &self,
        id: i32,
        title: String,
        content: String,
        event_date: Option<String>,
        attachment: Option<(String, String)>,
    ) -> Result<Option<announcements::Model>> {
        self.announcement_repo()
            .update(id, title, content, event_date, attachment)
            .await
    }

    pub async fn set_announcement_archived(&self, id: i32, archived: bool) -> Result<bool> {
        self.announcement_repo().set_archived(id, archived).await
    }

    pub async fn delete_announcement(&self, id: i32) -> Result<bool> {
        self.announcement_repo().delete(id).await
    }

    pub async fn bulk_delete_announcements(&self, ids: &[i32]) -> Result<u64> {
        self.announcement_repo().bulk_delete(ids).await
    }

    // --- reports ---

    pub async fn monthly_report(
        &self,
        month: u32,
        year: i32,
        group_ids: &[i32],
    ) -> Result<Vec<GroupMonthlyReport>> {
        self.report_repo().monthly(month, year, group_ids).await
    }
}
