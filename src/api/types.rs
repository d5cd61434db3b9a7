use serde::Serialize;

use crate::db::{AttendanceStats, User};
use crate::entities::{announcements, groups, meetings, mentees, profiles, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub blocked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserDto {
    #[must_use]
    pub fn from_user(user: User, profile: Option<profiles::Model>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.as_str().to_string(),
            blocked_at: user.blocked_at,
            profile: profile.map(ProfileDto::from),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub full_name: String,
    pub gender: String,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub profile_picture: Option<String>,
    pub status: String,
    pub status_note: Option<String>,
}

impl From<profiles::Model> for ProfileDto {
    fn from(model: profiles::Model) -> Self {
        Self {
            full_name: model.full_name,
            gender: model.gender,
            nickname: model.nickname,
            birth_date: model.birth_date,
            phone_number: model.phone_number,
            address: model.address,
            job: model.job,
            profile_picture: model.profile_picture,
            status: model.status,
            status_note: model.status_note,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenteeDto {
    pub id: i32,
    pub full_name: String,
    pub gender: String,
    pub status: String,
    pub group_id: Option<i32>,
    pub group_name: Option<String>,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl MenteeDto {
    #[must_use]
    pub fn from_model(mentee: mentees::Model, group: Option<&groups::Model>) -> Self {
        Self {
            id: mentee.id,
            full_name: mentee.full_name,
            gender: mentee.gender,
            status: mentee.status,
            group_id: mentee.group_id,
            group_name: group.map(|g| g.group_name.clone()),
            deleted_at: mentee.deleted_at,
            created_at: mentee.created_at,
            updated_at: mentee.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDto {
    pub id: i32,
    pub group_name: String,
    pub description: Option<String>,
    pub mentor_id: i32,
    pub mentor_email: Option<String>,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl GroupDto {
    #[must_use]
    pub fn from_model(group: groups::Model, mentor: Option<&users::Model>) -> Self {
        Self {
            id: group.id,
            group_name: group.group_name,
            description: group.description,
            mentor_id: group.mentor_id,
            mentor_email: mentor.map(|u| u.email.clone()),
            deleted_at: group.deleted_at,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDetailDto {
    #[serde(flatten)]
    pub group: GroupDto,
    pub members: Vec<MenteeDto>,
    pub stats: AttendanceStats,
}

#[derive(Debug, Serialize)]
pub struct GroupDeleteInfoDto {
    pub group: GroupDto,
    pub mentee_count: u64,
    pub meeting_count: u64,
}

#[derive(Debug, Serialize)]
pub struct MeetingDto {
    pub id: i32,
    pub group_id: i32,
    pub group_name: Option<String>,
    pub mentor_id: i32,
    pub meeting_date: String,
    pub place: Option<String>,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub meeting_type: String,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl MeetingDto {
    #[must_use]
    pub fn from_model(meeting: meetings::Model, group: Option<&groups::Model>) -> Self {
        Self {
            id: meeting.id,
            group_id: meeting.group_id,
            group_name: group.map(|g| g.group_name.clone()),
            mentor_id: meeting.mentor_id,
            meeting_date: meeting.meeting_date,
            place: meeting.place,
            topic: meeting.topic,
            notes: meeting.notes,
            meeting_type: meeting.meeting_type,
            deleted_at: meeting.deleted_at,
            created_at: meeting.created_at,
            updated_at: meeting.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceDto {
    pub id: i32,
    pub meeting_id: i32,
    pub mentee_id: i32,
    pub mentee_name: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeetingAttendanceDto {
    pub meeting: MeetingDto,
    pub attendances: Vec<AttendanceDto>,
    pub stats: AttendanceStats,
}

#[derive(Debug, Serialize)]
pub struct MeetingReportRowDto {
    pub meeting: MeetingDto,
    pub stats: AttendanceStats,
}

/// Per-meeting attendance summary plus the overall rate, the JSON twin of
/// the PDF/Excel exports.
#[derive(Debug, Serialize)]
pub struct AttendanceReportDto {
    pub meetings: Vec<MeetingReportRowDto>,
    pub overall: AttendanceStats,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub event_date: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub is_archived: bool,
    pub created_by: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<announcements::Model> for AnnouncementDto {
    fn from(model: announcements::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            event_date: model.event_date,
            file_path: model.file_path,
            file_type: model.file_type,
            is_archived: model.is_archived,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyReportDto {
    pub month: u32,
    pub year: i32,
    pub groups: Vec<GroupReportDto>,
}

#[derive(Debug, Serialize)]
pub struct GroupReportDto {
    pub group: GroupDto,
    pub meetings: Vec<MeetingDto>,
    pub meeting_count: usize,
    pub stats: AttendanceStats,
    pub mentees: Vec<MenteeReportDto>,
}

#[derive(Debug, Serialize)]
pub struct MenteeReportDto {
    pub mentee: MenteeDto,
    pub stats: AttendanceStats,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}
