use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, AttendanceDto, AttendanceReportDto, MeetingAttendanceDto,
    MeetingDto, MeetingReportRowDto, MessageResponse, auth::AuthUser, validation,
};
use crate::db::{AttendanceEntry, MeetingInput};

#[derive(Deserialize)]
pub struct MeetingRequest {
    #[serde(default)]
    pub group_id: i32,
    #[serde(default)]
    pub meeting_date: String,
    pub place: Option<String>,
    pub topic: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub meeting_type: String,
}

#[derive(Deserialize)]
pub struct AttendanceEntryRequest {
    pub mentee_id: i32,
    #[serde(default)]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordAttendanceRequest {
    #[serde(default)]
    pub attendances: Vec<AttendanceEntryRequest>,
}

async fn validate(
    state: &AppState,
    user: &AuthUser,
    payload: &MeetingRequest,
) -> Result<MeetingInput, ApiError> {
    let mut errors = validation::ValidationErrors::new();

    validation::validate_date(&mut errors, "meeting_date", &payload.meeting_date, "Tanggal pertemuan");
    let meeting_type =
        validation::validate_meeting_type(&mut errors, "meeting_type", &payload.meeting_type);

    let mut mentor_id = user.id;
    if payload.group_id <= 0 {
        errors.add("group_id", "Kelompok wajib dipilih.");
    } else {
        match state.store().get_group(payload.group_id).await? {
            Some((group, _)) => {
                if !user.role.is_admin() && group.mentor_id != user.id {
                    return Err(ApiError::Forbidden(
                        "Not the mentor of this group".to_string(),
                    ));
                }
                mentor_id = group.mentor_id;
            }
            None => errors.add("group_id", "Kelompok tidak ditemukan."),
        }
    }

    errors.into_result()?;

    Ok(MeetingInput {
        group_id: payload.group_id,
        mentor_id,
        meeting_date: payload.meeting_date.clone(),
        place: payload.place.clone(),
        topic: payload.topic.clone(),
        notes: payload.notes.clone(),
        meeting_type: meeting_type.unwrap_or_default(),
    })
}

async fn load_owned(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> Result<(crate::entities::meetings::Model, Option<crate::entities::groups::Model>), ApiError> {
    let (meeting, group) = state
        .store()
        .get_meeting(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meeting", id))?;

    if !user.role.is_admin() && meeting.mentor_id != user.id {
        return Err(ApiError::Forbidden(
            "Not the mentor of this meeting".to_string(),
        ));
    }

    Ok((meeting, group))
}

/// GET /meetings
pub async fn list(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<MeetingDto>>>, ApiError> {
    let rows = if user.role.is_admin() {
        state.store().list_meetings().await?
    } else {
        state.store().list_meetings_by_mentor(user.id).await?
    };

    let dtos = rows
        .into_iter()
        .map(|(meeting, group)| MeetingDto::from_model(meeting, group.as_ref()))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /meetings/{id}
/// The meeting together with its attendance rows and counters.
pub async fn get(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MeetingAttendanceDto>>, ApiError> {
    let (meeting, group) = load_owned(&state, &user, id).await?;

    let attendances = state
        .store()
        .list_attendances(id)
        .await?
        .into_iter()
        .map(|(attendance, mentee)| AttendanceDto {
            id: attendance.id,
            meeting_id: attendance.meeting_id,
            mentee_id: attendance.mentee_id,
            mentee_name: mentee.map(|m| m.full_name),
            status: attendance.status,
            notes: attendance.notes,
        })
        .collect();

    let stats = state.store().meeting_attendance_stats(id).await?;

    Ok(Json(ApiResponse::success(MeetingAttendanceDto {
        meeting: MeetingDto::from_model(meeting, group.as_ref()),
        attendances,
        stats,
    })))
}

/// POST /meetings
pub async fn create(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(payload): Json<MeetingRequest>,
) -> Result<Json<ApiResponse<MeetingDto>>, ApiError> {
    let input = validate(&state, &user, &payload).await?;
    let meeting = state.store().create_meeting(input).await?;

    Ok(Json(ApiResponse::success(MeetingDto::from_model(
        meeting, None,
    ))))
}

/// PUT /meetings/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<MeetingRequest>,
) -> Result<Json<ApiResponse<MeetingDto>>, ApiError> {
    load_owned(&state, &user, id).await?;
    let input = validate(&state, &user, &payload).await?;

    let meeting = state
        .store()
        .update_meeting(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Meeting", id))?;

    Ok(Json(ApiResponse::success(MeetingDto::from_model(
        meeting, None,
    ))))
}

/// POST /meetings/{id}/attendances
/// Records (or overwrites) attendance for the meeting in one call.
pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<Json<ApiResponse<MeetingAttendanceDto>>, ApiError> {
    let (meeting, group) = load_owned(&state, &user, id).await?;

    if payload.attendances.is_empty() {
        let mut errors = validation::ValidationErrors::new();
        errors.add("attendances", "Daftar kehadiran tidak boleh kosong.");
        return Err(errors.into());
    }

    let mut errors = validation::ValidationErrors::new();
    let mut entries = Vec::with_capacity(payload.attendances.len());
    for (i, entry) in payload.attendances.iter().enumerate() {
        let field = format!("attendances.{i}.status");
        if let Some(status) =
            validation::validate_attendance_status(&mut errors, &field, &entry.status)
        {
            entries.push(AttendanceEntry {
                mentee_id: entry.mentee_id,
                status,
                notes: entry.notes.clone(),
            });
        }
    }
    errors.into_result()?;

    state.store().record_attendances(id, &entries).await?;

    let attendances = state
        .store()
        .list_attendances(id)
        .await?
        .into_iter()
        .map(|(attendance, mentee)| AttendanceDto {
            id: attendance.id,
            meeting_id: attendance.meeting_id,
            mentee_id: attendance.mentee_id,
            mentee_name: mentee.map(|m| m.full_name),
            status: attendance.status,
            notes: attendance.notes,
        })
        .collect();

    let stats = state.store().meeting_attendance_stats(id).await?;

    Ok(Json(ApiResponse::success(MeetingAttendanceDto {
        meeting: MeetingDto::from_model(meeting, group.as_ref()),
        attendances,
        stats,
    })))
}

/// DELETE /meetings/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    load_owned(&state, &user, id).await?;

    if !state.store().delete_meeting(id).await? {
        return Err(ApiError::not_found("Meeting", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Meeting moved to trash".to_string(),
    })))
}

/// GET /meetings/trashed
pub async fn list_trashed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MeetingDto>>>, ApiError> {
    let rows = state.store().list_trashed_meetings().await?;

    let dtos = rows
        .into_iter()
        .map(|(meeting, group)| MeetingDto::from_model(meeting, group.as_ref()))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /meetings/{id}/restore
pub async fn restore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().restore_meeting(id).await? {
        return Err(ApiError::not_found("Meeting", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Meeting restored".to_string(),
    })))
}

/// DELETE /meetings/{id}/force
pub async fn force_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().force_delete_meeting(id).await? {
        return Err(ApiError::not_found("Meeting", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Meeting permanently deleted".to_string(),
    })))
}

#[derive(Deserialize)]
pub struct AttendanceReportQuery {
    pub group_id: Option<i32>,
}

/// GET /meetings/attendance-report
/// Per-meeting attendance summary plus an overall rate, scoped like the
/// meeting list (mentors see only their own meetings).
pub async fn attendance_report(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Query(query): Query<AttendanceReportQuery>,
) -> Result<Json<ApiResponse<AttendanceReportDto>>, ApiError> {
    let mut rows = if user.role.is_admin() {
        state.store().list_meetings().await?
    } else {
        state.store().list_meetings_by_mentor(user.id).await?
    };

    if let Some(group_id) = query.group_id {
        rows.retain(|(meeting, _)| meeting.group_id == group_id);
    }

    let meeting_ids: Vec<i32> = rows.iter().map(|(meeting, _)| meeting.id).collect();
    let overall = state.store().overall_attendance_stats(&meeting_ids).await?;

    let mut meetings = Vec::with_capacity(rows.len());
    for (meeting, group) in rows {
        let stats = state.store().meeting_attendance_stats(meeting.id).await?;
        meetings.push(MeetingReportRowDto {
            meeting: MeetingDto::from_model(meeting, group.as_ref()),
            stats,
        });
    }

    Ok(Json(ApiResponse::success(AttendanceReportDto {
        meetings,
        overall,
    })))
}

/// GET /meetings/export/pdf
pub async fn export_pdf() -> Result<Json<ApiResponse<()>>, ApiError> {
    Err(ApiError::not_implemented("PDF export"))
}

/// GET /meetings/export/excel
pub async fn export_excel() -> Result<Json<ApiResponse<()>>, ApiError> {
    Err(ApiError::not_implemented("Excel export"))
}
