use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use super::ConflictError;
use crate::entities::{groups, mentees, prelude::*};

pub struct MenteeInput {
    pub full_name: String,
    pub gender: String,
    pub status: String,
    pub group_id: Option<i32>,
}

pub struct MenteeRepository {
    conn: DatabaseConnection,
}

impl MenteeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists mentees that are not soft-deleted, each with its group (if any).
    pub async fn list(&self) -> Result<Vec<(mentees::Model, Option<groups::Model>)>> {
        let rows = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_null())
            .order_by_asc(mentees::Column::FullName)
            .find_also_related(Groups)
            .all(&self.conn)
            .await
            .context("Failed to list mentees")?;

        Ok(rows)
    }

    /// Mentees with no group, available for assignment.
    pub async fn list_available(&self) -> Result<Vec<mentees::Model>> {
        let rows = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_null())
            .filter(mentees::Column::GroupId.is_null())
            .order_by_asc(mentees::Column::FullName)
            .all(&self.conn)
            .await
            .context("Failed to list available mentees")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<(mentees::Model, Option<groups::Model>)>> {
        let row = Mentees::find_by_id(id)
            .filter(mentees::Column::DeletedAt.is_null())
            .find_also_related(Groups)
            .one(&self.conn)
            .await
            .context("Failed to query mentee")?;

        Ok(row)
    }

    pub async fn create(&self, input: MenteeInput) -> Result<mentees::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = mentees::ActiveModel {
            full_name: Set(input.full_name),
            gender: Set(input.gender),
            status: Set(input.status),
            group_id: Set(input.group_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert mentee")?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, input: MenteeInput) -> Result<Option<mentees::Model>> {
        let Some(mentee) = Mentees::find_by_id(id)
            .filter(mentees::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: mentees::ActiveModel = mentee.into();
        active.full_name = Set(input.full_name);
        active.gender = Set(input.gender);
        active.status = Set(input.status);
        active.group_id = Set(input.group_id);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    /// Soft delete: the row stays in place with `deleted_at` stamped so it
    /// can be restored from the trash.
    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let Some(mentee) = Mentees::find_by_id(id)
            .filter(mentees::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: mentees::ActiveModel = mentee.into();
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn list_trashed(&self) -> Result<Vec<mentees::Model>> {
        let rows = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_not_null())
            .order_by_desc(mentees::Column::DeletedAt)
            .all(&self.conn)
            .await
            .context("Failed to list trashed mentees")?;

        Ok(rows)
    }

    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(mentee) = Mentees::find_by_id(id)
            .filter(mentees::Column::DeletedAt.is_not_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: mentees::ActiveModel = mentee.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Permanent removal. Only trashed mentees can be force-deleted; active
    /// rows must go through the trash first.
    pub async fn force_delete(&self, id: i32) -> Result<bool> {
        let Some(mentee) = Mentees::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        if mentee.deleted_at.is_none() {
            return Err(ConflictError::NotTrashed { entity: "mentee", id }.into());
        }

        mentee.delete(&self.conn).await?;
        Ok(true)
    }
}
