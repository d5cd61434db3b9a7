use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::ConflictError;
use crate::entities::{group_histories, groups, meetings, mentees, prelude::*, users};

pub struct GroupInput {
    pub group_name: String,
    pub description: Option<String>,
    pub mentor_id: i32,
}

/// What a group deletion would touch, shown to the user before they confirm.
#[derive(Debug)]
pub struct GroupDeleteInfo {
    pub group: groups::Model,
    pub mentee_count: u64,
    pub meeting_count: u64,
}

pub struct GroupRepository {
    conn: DatabaseConnection,
}

impl GroupRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<(groups::Model, Option<users::Model>)>> {
        let rows = Groups::find()
            .filter(groups::Column::DeletedAt.is_null())
            .order_by_asc(groups::Column::GroupName)
            .find_also_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to list groups")?;

        Ok(rows)
    }

    /// Groups led by a particular mentor, for the mentor-facing views.
    pub async fn list_by_mentor(&self, mentor_id: i32) -> Result<Vec<groups::Model>> {
        let rows = Groups::find()
            .filter(groups::Column::DeletedAt.is_null())
            .filter(groups::Column::MentorId.eq(mentor_id))
            .order_by_asc(groups::Column::GroupName)
            .all(&self.conn)
            .await
            .context("Failed to list groups by mentor")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<(groups::Model, Option<users::Model>)>> {
        let row = Groups::find_by_id(id)
            .filter(groups::Column::DeletedAt.is_null())
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query group")?;

        Ok(row)
    }

    pub async fn members(&self, group_id: i32) -> Result<Vec<mentees::Model>> {
        let rows = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_null())
            .filter(mentees::Column::GroupId.eq(group_id))
            .order_by_asc(mentees::Column::FullName)
            .all(&self.conn)
            .await
            .context("Failed to list group members")?;

        Ok(rows)
    }

    pub async fn create(&self, input: GroupInput) -> Result<groups::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = groups::ActiveModel {
            group_name: Set(input.group_name),
            description: Set(input.description),
            mentor_id: Set(input.mentor_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert group")?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, input: GroupInput) -> Result<Option<groups::Model>> {
        let Some(group) = Groups::find_by_id(id)
            .filter(groups::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: groups::ActiveModel = group.into();
        active.group_name = Set(input.group_name);
        active.description = Set(input.description);
        active.mentor_id = Set(input.mentor_id);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    /// Move one mentee into a group (or out of every group when `to_group_id`
    /// is None). A history row is written for the change. Moving a mentee to
    /// the group it is already in is a no-op and writes no history.
    pub async fn move_mentee(
        &self,
        mentee_id: i32,
        to_group_id: Option<i32>,
        moved_by: i32,
    ) -> Result<mentees::Model> {
        let txn = self.conn.begin().await?;

        let Some(mentee) = Mentees::find_by_id(mentee_id)
            .filter(mentees::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
        else {
            return Err(ConflictError::MenteeUnavailable { id: mentee_id }.into());
        };

        if let Some(group_id) = to_group_id {
            let target = Groups::find_by_id(group_id)
                .filter(groups::Column::DeletedAt.is_null())
                .one(&txn)
                .await?;
            if target.is_none() {
                return Err(ConflictError::GroupUnavailable { id: group_id }.into());
            }
        }

        if mentee.group_id == to_group_id {
            txn.commit().await?;
            return Ok(mentee);
        }

        let from_group_id = mentee.group_id;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: mentees::ActiveModel = mentee.into();
        active.group_id = Set(to_group_id);
        active.updated_at = Set(now.clone());
        let updated = active.update(&txn).await?;

        group_histories::ActiveModel {
            mentee_id: Set(mentee_id),
            from_group_id: Set(from_group_id),
            to_group_id: Set(to_group_id),
            moved_by: Set(moved_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to write membership history")?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Batch transfer into one target group. All-or-nothing: if any mentee in
    /// the list is missing or trashed the whole transaction rolls back.
    pub async fn move_mentees(
        &self,
        mentee_ids: &[i32],
        to_group_id: i32,
        moved_by: i32,
    ) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let target = Groups::find_by_id(to_group_id)
            .filter(groups::Column::DeletedAt.is_null())
            .one(&txn)
            .await?;
        if target.is_none() {
            return Err(ConflictError::GroupUnavailable { id: to_group_id }.into());
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut moved = 0;

        for &mentee_id in mentee_ids {
            let Some(mentee) = Mentees::find_by_id(mentee_id)
                .filter(mentees::Column::DeletedAt.is_null())
                .one(&txn)
                .await?
            else {
                return Err(ConflictError::MenteeUnavailable { id: mentee_id }.into());
            };

            if mentee.group_id == Some(to_group_id) {
                continue;
            }

            let from_group_id = mentee.group_id;
            let mut active: mentees::ActiveModel = mentee.into();
            active.group_id = Set(Some(to_group_id));
            active.updated_at = Set(now.clone());
            active.update(&txn).await?;

            group_histories::ActiveModel {
                mentee_id: Set(mentee_id),
                from_group_id: Set(from_group_id),
                to_group_id: Set(Some(to_group_id)),
                moved_by: Set(moved_by),
                created_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            moved += 1;
        }

        txn.commit().await?;
        Ok(moved)
    }

    /// A read-only preview of what deleting a group would affect.
    pub async fn delete_info(&self, id: i32) -> Result<Option<GroupDeleteInfo>> {
        let Some(group) = Groups::find_by_id(id)
            .filter(groups::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mentee_count = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_null())
            .filter(mentees::Column::GroupId.eq(id))
            .count(&self.conn)
            .await?;

        let meeting_count = Meetings::find()
            .filter(meetings::Column::DeletedAt.is_null())
            .filter(meetings::Column::GroupId.eq(id))
            .count(&self.conn)
            .await?;

        Ok(Some(GroupDeleteInfo {
            group,
            mentee_count,
            meeting_count,
        }))
    }

    /// Soft-deletes a group and releases its members. Every released mentee
    /// gets a history row with a null `to_group_id`, all inside one
    /// transaction so the group never disappears with members still attached.
    pub async fn soft_delete(&self, id: i32, deleted_by: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(group) = Groups::find_by_id(id)
            .filter(groups::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let members = Mentees::find()
            .filter(mentees::Column::DeletedAt.is_null())
            .filter(mentees::Column::GroupId.eq(id))
            .all(&txn)
            .await?;

        for mentee in members {
            let mentee_id = mentee.id;
            let mut active: mentees::ActiveModel = mentee.into();
            active.group_id = Set(None);
            active.updated_at = Set(now.clone());
            active.update(&txn).await?;

            group_histories::ActiveModel {
                mentee_id: Set(mentee_id),
                from_group_id: Set(Some(id)),
                to_group_id: Set(None),
                moved_by: Set(deleted_by),
                created_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let mut active: groups::ActiveModel = group.into();
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    /// Deletes several groups in one call. Groups that do not exist are
    /// skipped; the returned count is how many were actually deleted.
    pub async fn bulk_delete(&self, ids: &[i32], deleted_by: i32) -> Result<u64> {
        let mut deleted = 0;
        for &id in ids {
            if self.soft_delete(id, deleted_by).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    pub async fn list_trashed(&self) -> Result<Vec<(groups::Model, Option<users::Model>)>> {
        let rows = Groups::find()
            .filter(groups::Column::DeletedAt.is_not_null())
            .order_by_desc(groups::Column::DeletedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to list trashed groups")?;

        Ok(rows)
    }

    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(group) = Groups::find_by_id(id)
            .filter(groups::Column::DeletedAt.is_not_null())
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: groups::ActiveModel = group.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Permanent removal of a trashed group. Refused while any meetings still
    /// reference the group; they hold the attendance history and must be
    /// purged first.
    pub async fn force_delete(&self, id: i32) -> Result<bool> {
        let Some(group) = Groups::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        if group.deleted_at.is_none() {
            return Err(ConflictError::NotTrashed { entity: "group", id }.into());
        }

        let meeting_count = Meetings::find()
            .filter(meetings::Column::GroupId.eq(id))
            .count(&self.conn)
            .await?;
        if meeting_count > 0 {
            return Err(ConflictError::MeetingsAttached {
                id,
                meetings: meeting_count,
            }
            .into());
        }

        group.delete(&self.conn).await?;
        Ok(true)
    }
}
