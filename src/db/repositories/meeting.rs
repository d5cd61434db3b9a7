use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use super::ConflictError;
use crate::entities::{groups, meetings, prelude::*};

pub struct MeetingInput {
    pub group_id: i32,
    pub mentor_id: i32,
    pub meeting_date: String,
    pub place: Option<String>,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub meeting_type: String,
}

pub struct MeetingRepository {
    conn: DatabaseConnection,
}

impl MeetingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        let rows = Meetings::find()
            .filter(meetings::Column::DeletedAt.is_null())
            .order_by_desc(meetings::Column::MeetingDate)
            .find_also_related(Groups)
            .all(&self.conn)
            .await
            .context("Failed to list meetings")?;

        Ok(rows)
    }

    pub async fn list_by_mentor(&self, mentor_id: i32) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        let rows = Meetings::find()
            .filter(meetings::Column::DeletedAt.is_null())
            .filter(meetings::Column::MentorId.eq(mentor_id))
            .order_by_desc(meetings::Column::MeetingDate)
            .find_also_related(Groups)
            .all(&self.conn)
            .await
            .context("Failed to list meetings by mentor")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<(meetings::Model, Option<groups::Model>)>> {
        let row = Meetings::find_by_id(id)
            .filter(meetings::Column::DeletedAt.is_null())
            .find_also_related(Groups)
            .one(&self.conn)
            .await
            .context("Failed to query meeting")?;

        Ok(row)
    }

    pub async fn create(&self, input: MeetingInput) -> Result<meetings::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = meetings::ActiveModel {
            group_id: Set(input.group_id),
            mentor_id: Set(input.mentor_id),
            meeting_date: Set(input.meeting_date),
            place: Set(input.place),
            topic: Set(input.topic),
            notes: Set(input.notes),
            meeting_type: Set(input.meeting_type),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert meeting")?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, input: MeetingInput) -> Result<Option<meetings::Model>> {
        let Some(meeting) = Meetings::find_by_id(id)
            .filter(meetings::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: meetings::ActiveModel = meeting.into();
        active.group_id = Set(input.group_id);
        active.mentor_id = Set(input.mentor_id);
        active.meeting_date = Set(input.meeting_date);
        active.place = Set(input.place);
        active.topic = Set(input.topic);
        active.notes = Set(input.notes);
        active.meeting_type = Set(input.meeting_type);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let Some(meeting) = Meetings::find_by_id(id)
            .filter(meetings::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: meetings::ActiveModel = meeting.into();
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn list_trashed(&self) -> Result<Vec<(meetings::Model, Option<groups::Model>)>> {
        let rows = Meetings::find()
            .filter(meetings::Column::DeletedAt.is_not_null())
            .order_by_desc(meetings::Column::DeletedAt)
            .find_also_related(Groups)
            .all(&self.conn)
            .await
            .context("Failed to list trashed meetings")?;

        Ok(rows)
    }

    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(meeting) = Meetings::find_by_id(id)
            .filter(meetings::Column::DeletedAt.is_not_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: meetings::ActiveModel = meeting.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Permanent removal of a trashed meeting; attendance rows cascade.
    pub async fn force_delete(&self, id: i32) -> Result<bool> {
        let Some(meeting) = Meetings::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        if meeting.deleted_at.is_none() {
            return Err(ConflictError::NotTrashed {
                entity: "meeting",
                id,
            }
            .into());
        }

        meeting.delete(&self.conn).await?;
        Ok(true)
    }
}
