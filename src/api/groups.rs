use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CountResponse, GroupDeleteInfoDto, GroupDetailDto, GroupDto,
    MenteeDto, MessageResponse, auth::AuthUser, validation,
};
use crate::db::GroupInput;
use crate::models::Role;

#[derive(Deserialize)]
pub struct GroupRequest {
    #[serde(default)]
    pub group_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub mentor_id: i32,
}

#[derive(Deserialize)]
pub struct MoveMenteesRequest {
    #[serde(default)]
    pub mentee_ids: Vec<i32>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<i32>,
}

async fn validate(state: &AppState, payload: &GroupRequest) -> Result<GroupInput, ApiError> {
    let mut errors = validation::ValidationErrors::new();

    validation::require(&mut errors, "group_name", &payload.group_name, "Nama kelompok");
    validation::max_len(&mut errors, "group_name", &payload.group_name, 255, "Nama kelompok");

    if payload.mentor_id <= 0 {
        errors.add("mentor_id", "Mentor wajib dipilih.");
    } else {
        match state.store().get_user(payload.mentor_id).await? {
            Some(user) if user.role == Role::Mentor => {}
            _ => errors.add("mentor_id", "Mentor tidak ditemukan."),
        }
    }

    errors.into_result()?;

    Ok(GroupInput {
        group_name: payload.group_name.trim().to_string(),
        description: payload.description.clone(),
        mentor_id: payload.mentor_id,
    })
}

/// GET /groups
/// Admins see every group; mentors only their own.
pub async fn list(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<GroupDto>>>, ApiError> {
    let dtos = if user.role.is_admin() {
        state
            .store()
            .list_groups()
            .await?
            .into_iter()
            .map(|(group, mentor)| GroupDto::from_model(group, mentor.as_ref()))
            .collect()
    } else {
        state
            .store()
            .list_groups_by_mentor(user.id)
            .await?
            .into_iter()
            .map(|group| GroupDto::from_model(group, None))
            .collect()
    };

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /groups/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<GroupDetailDto>>, ApiError> {
    let (group, mentor) = state
        .store()
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group", id))?;

    if !user.role.is_admin() && group.mentor_id != user.id {
        return Err(ApiError::Forbidden(
            "Not the mentor of this group".to_string(),
        ));
    }

    let members = state
        .store()
        .group_members(id)
        .await?
        .into_iter()
        .map(|mentee| MenteeDto::from_model(mentee, None))
        .collect();

    let stats = state.store().group_attendance_stats(id).await?;

    Ok(Json(ApiResponse::success(GroupDetailDto {
        group: GroupDto::from_model(group, mentor.as_ref()),
        members,
        stats,
    })))
}

/// POST /groups
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GroupRequest>,
) -> Result<Json<ApiResponse<GroupDto>>, ApiError> {
    let input = validate(&state, &payload).await?;
    let group = state.store().create_group(input).await?;

    Ok(Json(ApiResponse::success(GroupDto::from_model(
        group, None,
    ))))
}

/// PUT /groups/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<GroupRequest>,
) -> Result<Json<ApiResponse<GroupDto>>, ApiError> {
    let input = validate(&state, &payload).await?;

    let group = state
        .store()
        .update_group(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Group", id))?;

    Ok(Json(ApiResponse::success(GroupDto::from_model(
        group, None,
    ))))
}

/// POST /groups/{id}/move-mentees
/// Batch transfer into this group. All-or-nothing: one bad mentee ID fails
/// the whole batch.
pub async fn move_mentees(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<MoveMenteesRequest>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    if payload.mentee_ids.is_empty() {
        let mut errors = validation::ValidationErrors::new();
        errors.add("mentee_ids", "Pilih minimal satu mentee.");
        return Err(errors.into());
    }

    state
        .store()
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group", id))?;

    let moved = state
        .store()
        .move_mentees(&payload.mentee_ids, id, user.id)
        .await?;

    Ok(Json(ApiResponse::success(CountResponse { count: moved })))
}

/// GET /groups/{id}/delete-info
/// Read-only preview of what deleting this group would affect.
pub async fn delete_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<GroupDeleteInfoDto>>, ApiError> {
    let info = state
        .store()
        .group_delete_info(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group", id))?;

    Ok(Json(ApiResponse::success(GroupDeleteInfoDto {
        group: GroupDto::from_model(info.group, None),
        mentee_count: info.mentee_count,
        meeting_count: info.meeting_count,
    })))
}

/// DELETE /groups/{id}
/// Soft-deletes the group and releases its members.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().delete_group(id, user.id).await? {
        return Err(ApiError::not_found("Group", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Group moved to trash".to_string(),
    })))
}

/// POST /groups/bulk-delete
pub async fn bulk_delete(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    if payload.ids.is_empty() {
        let mut errors = validation::ValidationErrors::new();
        errors.add("ids", "Pilih minimal satu kelompok.");
        return Err(errors.into());
    }

    let deleted = state.store().bulk_delete_groups(&payload.ids, user.id).await?;

    Ok(Json(ApiResponse::success(CountResponse { count: deleted })))
}

/// GET /groups/trashed
pub async fn list_trashed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<GroupDto>>>, ApiError> {
    let rows = state.store().list_trashed_groups().await?;

    let dtos = rows
        .into_iter()
        .map(|(group, mentor)| GroupDto::from_model(group, mentor.as_ref()))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /groups/{id}/restore
pub async fn restore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().restore_group(id).await? {
        return Err(ApiError::not_found("Group", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Group restored".to_string(),
    })))
}

/// DELETE /groups/{id}/force
pub async fn force_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().force_delete_group(id).await? {
        return Err(ApiError::not_found("Group", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Group permanently deleted".to_string(),
    })))
}
