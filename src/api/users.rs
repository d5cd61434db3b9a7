use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, MessageResponse, ProfileDto, UserDto, auth::AuthUser,
    validation,
};
use crate::db::ProfileInput;
use crate::models::{MenteeStatus, Role};
use crate::services::UploadError;

#[derive(Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub email: String,
    /// Required on create, optional on update (blank keeps the password).
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub status_note: Option<String>,
}

struct ValidatedUser {
    email: String,
    password: Option<String>,
    full_name: String,
    gender: String,
}

async fn validate_user(
    state: &AppState,
    payload: &UserRequest,
    exclude_id: Option<i32>,
    password_required: bool,
) -> Result<ValidatedUser, ApiError> {
    let mut errors = validation::ValidationErrors::new();

    validation::validate_email(&mut errors, "email", &payload.email);
    if !payload.email.trim().is_empty()
        && state.store().email_taken(&payload.email, exclude_id).await?
    {
        errors.add("email", "Email sudah digunakan.");
    }

    let password = if payload.password.is_empty() && !password_required {
        None
    } else {
        validation::validate_password(&mut errors, "password", &payload.password);
        Some(payload.password.clone())
    };

    validation::require(&mut errors, "full_name", &payload.full_name, "Nama lengkap");
    let gender = validation::validate_gender(&mut errors, "gender", &payload.gender);

    if let Some(date) = &payload.birth_date {
        validation::validate_optional_date(&mut errors, "birth_date", date, "Tanggal lahir");
    }

    errors.into_result()?;

    Ok(ValidatedUser {
        email: payload.email.trim().to_string(),
        password,
        full_name: payload.full_name.trim().to_string(),
        gender: gender.unwrap_or_default(),
    })
}

async fn list_role(state: &AppState, role: Role) -> Result<Vec<UserDto>, ApiError> {
    let rows = state.store().list_users_by_role(role).await?;
    Ok(rows
        .into_iter()
        .map(|(user, profile)| UserDto::from_user(user, profile))
        .collect())
}

async fn create_with_role(
    state: &AppState,
    payload: UserRequest,
    role: Role,
) -> Result<UserDto, ApiError> {
    let validated = validate_user(state, &payload, None, true).await?;
    let security = state.config().read().await.security.clone();

    let user = state
        .store()
        .create_user(
            &validated.email,
            validated.password.as_deref().unwrap_or_default(),
            role,
            &security,
        )
        .await?;

    let profile = state
        .store()
        .upsert_profile(ProfileInput {
            user_id: user.id,
            full_name: validated.full_name,
            gender: validated.gender,
            nickname: payload.nickname,
            birth_date: payload.birth_date,
            phone_number: payload.phone_number,
            address: payload.address,
            job: payload.job,
            status: MenteeStatus::Aktif.as_str().to_string(),
            status_note: None,
        })
        .await?;

    tracing::info!("Created {} account: {}", role, user.email);
    Ok(UserDto::from_user(user, Some(profile)))
}

async fn update_with_role(
    state: &AppState,
    id: i32,
    payload: UserRequest,
    role: Role,
) -> Result<UserDto, ApiError> {
    let existing = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    if existing.role != role {
        return Err(ApiError::not_found("User", id));
    }

    let validated = validate_user(state, &payload, Some(id), false).await?;
    let security = state.config().read().await.security.clone();

    let user = state
        .store()
        .update_user(id, &validated.email, validated.password.as_deref(), &security)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let existing_profile = state.store().get_profile(id).await?;
    let profile = state
        .store()
        .upsert_profile(ProfileInput {
            user_id: id,
            full_name: validated.full_name,
            gender: validated.gender,
            nickname: payload.nickname,
            birth_date: payload.birth_date,
            phone_number: payload.phone_number,
            address: payload.address,
            job: payload.job,
            status: existing_profile
                .as_ref()
                .map_or_else(|| MenteeStatus::Aktif.as_str().to_string(), |p| p.status.clone()),
            status_note: existing_profile.and_then(|p| p.status_note),
        })
        .await?;

    Ok(UserDto::from_user(user, Some(profile)))
}

async fn delete_with_role(state: &AppState, id: i32, role: Role) -> Result<(), ApiError> {
    let existing = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    if existing.role != role {
        return Err(ApiError::not_found("User", id));
    }

    state.store().delete_user(id).await?;
    Ok(())
}

// ============================================================================
// Admin accounts (super admin only)
// ============================================================================

pub async fn list_admins(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        list_role(&state, Role::Admin).await?,
    )))
}

pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let dto = create_with_role(&state, payload, Role::Admin).await?;
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let dto = update_with_role(&state, id, payload, Role::Admin).await?;
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    delete_with_role(&state, id, Role::Admin).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Admin deleted".to_string(),
    })))
}

// ============================================================================
// Mentor accounts (admin and up)
// ============================================================================

pub async fn list_mentors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        list_role(&state, Role::Mentor).await?,
    )))
}

pub async fn create_mentor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let dto = create_with_role(&state, payload, Role::Mentor).await?;
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn update_mentor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let dto = update_with_role(&state, id, payload, Role::Mentor).await?;
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn delete_mentor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    delete_with_role(&state, id, Role::Mentor).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Mentor deleted".to_string(),
    })))
}

// ============================================================================
// Blocking
// ============================================================================

/// POST /users/{id}/block
/// An account can only be blocked by someone higher in the role order, and
/// never by itself.
pub async fn block(
    State(state): State<Arc<AppState>>,
    axum::Extension(actor): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if actor.id == id {
        return Err(ApiError::Forbidden(
            "You cannot block your own account".to_string(),
        ));
    }

    let target = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let allowed = match target.role {
        Role::Mentor => actor.role.is_admin(),
        Role::Admin => actor.role == Role::SuperAdmin,
        Role::SuperAdmin => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "Insufficient role to block this account".to_string(),
        ));
    }

    let user = state
        .store()
        .block_user(id, actor.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    // Blocked accounts lose their sessions immediately.
    state.store().revoke_all_tokens(id).await?;

    tracing::info!("Blocked account {} by {}", user.email, actor.email);
    Ok(Json(ApiResponse::success(UserDto::from_user(user, None))))
}

/// POST /users/{id}/unblock
pub async fn unblock(
    State(state): State<Arc<AppState>>,
    axum::Extension(actor): axum::Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let target = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let allowed = match target.role {
        Role::Mentor => actor.role.is_admin(),
        Role::Admin | Role::SuperAdmin => actor.role == Role::SuperAdmin,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "Insufficient role to unblock this account".to_string(),
        ));
    }

    let user = state
        .store()
        .unblock_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    Ok(Json(ApiResponse::success(UserDto::from_user(user, None))))
}

// ============================================================================
// Own profile
// ============================================================================

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> Result<Json<ApiResponse<Option<ProfileDto>>>, ApiError> {
    let profile = state.store().get_profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile.map(ProfileDto::from))))
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let mut errors = validation::ValidationErrors::new();
    validation::require(&mut errors, "full_name", &payload.full_name, "Nama lengkap");
    let gender = validation::validate_gender(&mut errors, "gender", &payload.gender);
    if let Some(date) = &payload.birth_date {
        validation::validate_optional_date(&mut errors, "birth_date", date, "Tanggal lahir");
    }
    errors.into_result()?;

    let existing = state.store().get_profile(user.id).await?;
    let profile = state
        .store()
        .upsert_profile(ProfileInput {
            user_id: user.id,
            full_name: payload.full_name.trim().to_string(),
            gender: gender.unwrap_or_default(),
            nickname: payload.nickname,
            birth_date: payload.birth_date,
            phone_number: payload.phone_number,
            address: payload.address,
            job: payload.job,
            status: existing
                .map_or_else(|| MenteeStatus::Aktif.as_str().to_string(), |p| p.status),
            status_note: payload.status_note,
        })
        .await?;

    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}

/// POST /profile/picture
/// Multipart upload with a single `picture` field.
pub async fn upload_picture(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut stored: Option<String> = None;
    let mut errors = validation::ValidationErrors::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("picture") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;

        match state.uploads().save_profile_picture(&content_type, &data).await {
            Ok(path) => stored = Some(path),
            Err(UploadError::TooLarge { max_kb }) => {
                errors.add("picture", format!("Foto profil maksimal {max_kb} KB."));
            }
            Err(UploadError::UnsupportedType(t)) => {
                errors.add("picture", format!("Jenis berkas '{t}' tidak didukung."));
            }
            Err(UploadError::Io(e)) => {
                return Err(ApiError::internal(format!("Failed to store upload: {e}")));
            }
        }
    }

    errors.into_result()?;

    let Some(path) = stored else {
        let mut errors = validation::ValidationErrors::new();
        errors.add("picture", "Foto profil wajib diunggah.");
        return Err(errors.into());
    };

    if !state.store().set_profile_picture(user.id, &path).await? {
        return Err(ApiError::Conflict(
            "Profile must be completed before uploading a picture".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "profile_picture": path
    }))))
}
