use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MenteeDto, MessageResponse, auth::AuthUser, validation};
use crate::db::MenteeInput;

#[derive(Deserialize)]
pub struct MenteeRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub status: String,
    pub group_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub group_id: Option<i32>,
}

async fn validate(state: &AppState, payload: &MenteeRequest) -> Result<MenteeInput, ApiError> {
    let mut errors = validation::ValidationErrors::new();

    validation::require(&mut errors, "full_name", &payload.full_name, "Nama lengkap");
    validation::max_len(&mut errors, "full_name", &payload.full_name, 255, "Nama lengkap");
    let gender = validation::validate_gender(&mut errors, "gender", &payload.gender);
    let status = validation::validate_mentee_status(&mut errors, "status", &payload.status);

    // Trashed groups are invisible here, so a deleted group's id is rejected
    // the same way as an unknown one.
    if let Some(group_id) = payload.group_id {
        if state.store().get_group(group_id).await?.is_none() {
            errors.add("group_id", "Kelompok tidak ditemukan.");
        }
    }

    errors.into_result()?;

    Ok(MenteeInput {
        full_name: payload.full_name.trim().to_string(),
        gender: gender.unwrap_or_default(),
        status: status.unwrap_or_default(),
        group_id: payload.group_id,
    })
}

/// GET /mentees
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MenteeDto>>>, ApiError> {
    let rows = state.store().list_mentees().await?;

    let dtos = rows
        .into_iter()
        .map(|(mentee, group)| MenteeDto::from_model(mentee, group.as_ref()))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /mentees/available
/// Mentees with no group, ready to be assigned.
pub async fn list_available(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MenteeDto>>>, ApiError> {
    let rows = state.store().list_available_mentees().await?;

    let dtos = rows
        .into_iter()
        .map(|mentee| MenteeDto::from_model(mentee, None))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /mentees/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (mentee, group) = state
        .store()
        .get_mentee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Mentee", id))?;

    let stats = state.store().mentee_attendance_stats(id).await?;

    let dto = MenteeDto::from_model(mentee, group.as_ref());
    Ok(Json(ApiResponse::success(serde_json::json!({
        "mentee": dto,
        "stats": stats,
    }))))
}

/// POST /mentees
pub async fn create(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(payload): Json<MenteeRequest>,
) -> Result<Json<ApiResponse<MenteeDto>>, ApiError> {
    let mut input = validate(&state, &payload).await?;
    let group_id = input.group_id.take();

    // Insert without a group, then assign through the history-writing path
    // so the initial placement leaves a membership row like any other move.
    let mut mentee = state.store().create_mentee(input).await?;
    if group_id.is_some() {
        mentee = state
            .store()
            .move_mentee(mentee.id, group_id, user.id)
            .await?;
    }

    Ok(Json(ApiResponse::success(MenteeDto::from_model(
        mentee, None,
    ))))
}

/// PUT /mentees/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<MenteeRequest>,
) -> Result<Json<ApiResponse<MenteeDto>>, ApiError> {
    let mut input = validate(&state, &payload).await?;

    let (existing, _) = state
        .store()
        .get_mentee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Mentee", id))?;

    // Group changes go through the history-writing path, not a plain update.
    let new_group = input.group_id;
    input.group_id = existing.group_id;

    let updated = state
        .store()
        .update_mentee(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Mentee", id))?;

    let updated = if new_group == updated.group_id {
        updated
    } else {
        state.store().move_mentee(id, new_group, user.id).await?
    };

    Ok(Json(ApiResponse::success(MenteeDto::from_model(
        updated, None,
    ))))
}

/// POST /mentees/{id}/move
pub async fn move_mentee(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<ApiResponse<MenteeDto>>, ApiError> {
    state
        .store()
        .get_mentee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Mentee", id))?;

    if let Some(group_id) = payload.group_id {
        state
            .store()
            .get_group(group_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group", group_id))?;
    }

    let mentee = state
        .store()
        .move_mentee(id, payload.group_id, user.id)
        .await?;

    Ok(Json(ApiResponse::success(MenteeDto::from_model(
        mentee, None,
    ))))
}

/// DELETE /mentees/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().delete_mentee(id).await? {
        return Err(ApiError::not_found("Mentee", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Mentee moved to trash".to_string(),
    })))
}

/// GET /mentees/trashed
pub async fn list_trashed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MenteeDto>>>, ApiError> {
    let rows = state.store().list_trashed_mentees().await?;

    let dtos = rows
        .into_iter()
        .map(|mentee| MenteeDto::from_model(mentee, None))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /mentees/{id}/restore
pub async fn restore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().restore_mentee(id).await? {
        return Err(ApiError::not_found("Mentee", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Mentee restored".to_string(),
    })))
}

/// DELETE /mentees/{id}/force
pub async fn force_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().force_delete_mentee(id).await? {
        return Err(ApiError::not_found("Mentee", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Mentee permanently deleted".to_string(),
    })))
}
