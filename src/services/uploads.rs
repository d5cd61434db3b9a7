use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::UploadsConfig;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const ATTACHMENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file exceeds the {max_kb} KB limit")]
    TooLarge { max_kb: u64 },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stores uploaded files under the public storage directory with random
/// names, so a request can never pick the destination path.
#[derive(Clone)]
pub struct UploadService {
    config: UploadsConfig,
}

impl UploadService {
    #[must_use]
    pub const fn new(config: UploadsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn storage_path(&self) -> &str {
        &self.config.storage_path
    }

    /// Saves a profile picture. Returns the path relative to the storage
    /// directory, as stored in the profile row.
    pub async fn save_profile_picture(
        &self,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, UploadError> {
        self.save(
            "profiles",
            content_type,
            data,
            IMAGE_TYPES,
            self.config.max_image_kb,
        )
        .await
    }

    /// Saves an announcement attachment. Returns the relative path and the
    /// content type recorded alongside it.
    pub async fn save_attachment(
        &self,
        content_type: &str,
        data: &[u8],
    ) -> Result<(String, String), UploadError> {
        let path = self
            .save(
                "announcements",
                content_type,
                data,
                ATTACHMENT_TYPES,
                self.config.max_attachment_kb,
            )
            .await?;

        Ok((path, content_type.to_string()))
    }

    async fn save(
        &self,
        subdir: &str,
        content_type: &str,
        data: &[u8],
        allowed: &[&str],
        max_kb: u64,
    ) -> Result<String, UploadError> {
        if !allowed.contains(&content_type) {
            return Err(UploadError::UnsupportedType(content_type.to_string()));
        }

        let size_kb = data.len() as u64 / 1024;
        if size_kb > max_kb {
            return Err(UploadError::TooLarge { max_kb });
        }

        let ext = extension_for(content_type);
        let relative = format!("{subdir}/{}.{ext}", Uuid::new_v4());
        let full: PathBuf = Path::new(&self.config.storage_path).join(&relative);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, data).await?;

        info!("Stored upload: {} ({} KB)", relative, size_kb);
        Ok(relative)
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_limits(max_image_kb: u64) -> UploadService {
        UploadService::new(UploadsConfig {
            storage_path: std::env::temp_dir()
                .join(format!("liqo-uploads-{}", Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            max_image_kb,
            max_attachment_kb: 10240,
        })
    }

    #[tokio::test]
    async fn rejects_unsupported_image_type() {
        let service = service_with_limits(2048);
        let result = service.save_profile_picture("image/gif", b"GIF89a").await;
        assert!(matches!(result, Err(UploadError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let service = service_with_limits(1);
        let data = vec![0_u8; 4096];
        let result = service.save_profile_picture("image/png", &data).await;
        assert!(matches!(result, Err(UploadError::TooLarge { max_kb: 1 })));
    }

    #[tokio::test]
    async fn stores_file_with_random_name() {
        let service = service_with_limits(2048);
        let path = service
            .save_profile_picture("image/png", b"\x89PNG")
            .await
            .unwrap();

        assert!(path.starts_with("profiles/"));
        assert!(path.ends_with(".png"));

        let full = Path::new(service.storage_path()).join(&path);
        assert!(full.exists());
    }
}
