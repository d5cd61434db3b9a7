use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AnnouncementDto, AppState, CountResponse, MessageResponse,
    auth::AuthUser, validation,
};
use crate::db::AnnouncementInput;
use crate::services::UploadError;

#[derive(Default)]
struct AnnouncementForm {
    title: String,
    content: String,
    event_date: Option<String>,
    attachment: Option<(String, String)>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<i32>,
}

/// Reads the multipart form, storing the attachment as it streams in.
async fn read_form(state: &AppState, mut multipart: Multipart) -> Result<AnnouncementForm, ApiError> {
    let mut form = AnnouncementForm::default();
    let mut errors = validation::ValidationErrors::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
            }
            "content" => {
                form.content = field
                    .text()
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
            }
            "event_date" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                if !value.trim().is_empty() {
                    form.event_date = Some(value);
                }
            }
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                if data.is_empty() {
                    continue;
                }

                match state.uploads().save_attachment(&content_type, &data).await {
                    Ok(stored) => form.attachment = Some(stored),
                    Err(UploadError::TooLarge { max_kb }) => {
                        errors.add("file", format!("Lampiran maksimal {max_kb} KB."));
                    }
                    Err(UploadError::UnsupportedType(t)) => {
                        errors.add("file", format!("Jenis lampiran '{t}' tidak didukung."));
                    }
                    Err(UploadError::Io(e)) => {
                        return Err(ApiError::internal(format!("Failed to store upload: {e}")));
                    }
                }
            }
            _ => {}
        }
    }

    validation::require(&mut errors, "title", &form.title, "Judul");
    validation::max_len(&mut errors, "title", &form.title, 255, "Judul");
    validation::require(&mut errors, "content", &form.content, "Isi pengumuman");
    if let Some(date) = &form.event_date {
        validation::validate_optional_date(&mut errors, "event_date", date, "Tanggal acara");
    }

    errors.into_result()?;
    Ok(form)
}

/// GET /announcements
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AnnouncementDto>>>, ApiError> {
    let rows = state.store().list_announcements().await?;
    let dtos = rows.into_iter().map(AnnouncementDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /announcements/archived
pub async fn list_archived(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AnnouncementDto>>>, ApiError> {
    let rows = state.store().list_archived_announcements().await?;
    let dtos = rows.into_iter().map(AnnouncementDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /announcements/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AnnouncementDto>>, ApiError> {
    let row = state
        .store()
        .get_announcement(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement", id))?;

    Ok(Json(ApiResponse::success(AnnouncementDto::from(row))))
}

/// POST /announcements
pub async fn create(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AnnouncementDto>>, ApiError> {
    let form = read_form(&state, multipart).await?;
    let (file_path, file_type) = form.attachment.map(|(p, t)| (Some(p), Some(t))).unwrap_or((None, None));

    let row = state
        .store()
        .create_announcement(AnnouncementInput {
            title: form.title,
            content: form.content,
            event_date: form.event_date,
            file_path,
            file_type,
            created_by: user.id,
        })
        .await?;

    Ok(Json(ApiResponse::success(AnnouncementDto::from(row))))
}

/// POST /announcements/{id}
/// Multipart update; a new attachment replaces the old one.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AnnouncementDto>>, ApiError> {
    let form = read_form(&state, multipart).await?;

    let row = state
        .store()
        .update_announcement(id, form.title, form.content, form.event_date, form.attachment)
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement", id))?;

    Ok(Json(ApiResponse::success(AnnouncementDto::from(row))))
}

/// POST /announcements/{id}/archive
pub async fn archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().set_announcement_archived(id, true).await? {
        return Err(ApiError::not_found("Announcement", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Announcement archived".to_string(),
    })))
}

/// POST /announcements/{id}/unarchive
pub async fn unarchive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().set_announcement_archived(id, false).await? {
        return Err(ApiError::not_found("Announcement", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Announcement unarchived".to_string(),
    })))
}

/// DELETE /announcements/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().delete_announcement(id).await? {
        return Err(ApiError::not_found("Announcement", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Announcement deleted".to_string(),
    })))
}

/// POST /announcements/bulk-delete
pub async fn bulk_delete(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    if payload.ids.is_empty() {
        let mut errors = validation::ValidationErrors::new();
        errors.add("ids", "Pilih minimal satu pengumuman.");
        return Err(errors.into());
    }

    let deleted = state.store().bulk_delete_announcements(&payload.ids).await?;

    Ok(Json(ApiResponse::success(CountResponse { count: deleted })))
}
