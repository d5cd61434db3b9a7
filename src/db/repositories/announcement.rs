use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{announcements, prelude::*};

pub struct AnnouncementInput {
    pub title: String,
    pub content: String,
    pub event_date: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub created_by: i32,
}

pub struct AnnouncementRepository {
    conn: DatabaseConnection,
}

impl AnnouncementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<announcements::Model>> {
        let rows = Announcements::find()
            .filter(announcements::Column::IsArchived.eq(false))
            .order_by_desc(announcements::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list announcements")?;

        Ok(rows)
    }

    pub async fn list_archived(&self) -> Result<Vec<announcements::Model>> {
        let rows = Announcements::find()
            .filter(announcements::Column::IsArchived.eq(true))
            .order_by_desc(announcements::Column::UpdatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list archived announcements")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<announcements::Model>> {
        let row = Announcements::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query announcement")?;

        Ok(row)
    }

    pub async fn create(&self, input: AnnouncementInput) -> Result<announcements::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = announcements::ActiveModel {
            title: Set(input.title),
            content: Set(input.content),
            event_date: Set(input.event_date),
            file_path: Set(input.file_path),
            file_type: Set(input.file_type),
            is_archived: Set(false),
            created_by: Set(input.created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert announcement")?;

        Ok(model)
    }

    /// Updates title, content and event date. A new attachment replaces the
    /// old path; `None` leaves the current attachment in place.
    pub async fn update(
        &self,
        id: i32,
        title: String,
        content: String,
        event_date: Option<String>,
        attachment: Option<(String, String)>,
    ) -> Result<Option<announcements::Model>> {
        let Some(row) = Announcements::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: announcements::ActiveModel = row.into();
        active.title = Set(title);
        active.content = Set(content);
        active.event_date = Set(event_date);
        if let Some((path, file_type)) = attachment {
            active.file_path = Set(Some(path));
            active.file_type = Set(Some(file_type));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    pub async fn set_archived(&self, id: i32, archived: bool) -> Result<bool> {
        let Some(row) = Announcements::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: announcements::ActiveModel = row.into();
        active.is_archived = Set(archived);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let Some(row) = Announcements::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        row.delete(&self.conn).await?;
        Ok(true)
    }

    pub async fn bulk_delete(&self, ids: &[i32]) -> Result<u64> {
        let result = Announcements::delete_many()
            .filter(announcements::Column::Id.is_in(ids.to_vec()))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
