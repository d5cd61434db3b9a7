use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::attendance::AttendanceStats;
use crate::entities::{attendances, groups, meetings, mentees, prelude::*, users};

/// One group's slice of the monthly report.
#[derive(Debug)]
pub struct GroupMonthlyReport {
    pub group: groups::Model,
    pub mentor: Option<users::Model>,
    pub meetings: Vec<meetings::Model>,
    pub stats: AttendanceStats,
    pub mentee_rows: Vec<MenteeMonthlyRow>,
}

/// Per-mentee counters within the reported month.
#[derive(Debug)]
pub struct MenteeMonthlyRow {
    pub mentee: mentees::Model,
    pub stats: AttendanceStats,
}

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Builds the monthly recap. With `group_ids` empty the report covers
    /// every active group; otherwise only the listed ones. Groups with no
    /// meetings in the month still appear, with zeroed counters.
    pub async fn monthly(
        &self,
        month: u32,
        year: i32,
        group_ids: &[i32],
    ) -> Result<Vec<GroupMonthlyReport>> {
        let mut query = Groups::find()
            .filter(groups::Column::DeletedAt.is_null())
            .order_by_asc(groups::Column::GroupName);
        if !group_ids.is_empty() {
            query = query.filter(groups::Column::Id.is_in(group_ids.to_vec()));
        }

        let groups = query
            .find_also_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to load groups for report")?;

        let date_prefix = format!("{year:04}-{month:02}-%");
        let mut report = Vec::with_capacity(groups.len());

        for (group, mentor) in groups {
            let meetings = Meetings::find()
                .filter(meetings::Column::DeletedAt.is_null())
                .filter(meetings::Column::GroupId.eq(group.id))
                .filter(meetings::Column::MeetingDate.like(&date_prefix))
                .order_by_asc(meetings::Column::MeetingDate)
                .all(&self.conn)
                .await?;

            let meeting_ids: Vec<i32> = meetings.iter().map(|m| m.id).collect();

            let rows: Vec<(i32, String)> = if meeting_ids.is_empty() {
                Vec::new()
            } else {
                Attendances::find()
                    .filter(attendances::Column::MeetingId.is_in(meeting_ids))
                    .select_only()
                    .column(attendances::Column::MenteeId)
                    .column(attendances::Column::Status)
                    .into_tuple()
                    .all(&self.conn)
                    .await
                    .context("Failed to load attendance rows for report")?
            };

            let stats =
                AttendanceStats::from_statuses(rows.iter().map(|(_, status)| status.as_str()));

            let members = Mentees::find()
                .filter(mentees::Column::DeletedAt.is_null())
                .filter(mentees::Column::GroupId.eq(group.id))
                .order_by_asc(mentees::Column::FullName)
                .all(&self.conn)
                .await?;

            let mentee_rows = members
                .into_iter()
                .map(|mentee| {
                    let stats = AttendanceStats::from_statuses(
                        rows.iter()
                            .filter(|(mentee_id, _)| *mentee_id == mentee.id)
                            .map(|(_, status)| status.as_str()),
                    );
                    MenteeMonthlyRow { mentee, stats }
                })
                .collect();

            report.push(GroupMonthlyReport {
                group,
                mentor,
                meetings,
                stats,
                mentee_rows,
            });
        }

        Ok(report)
    }
}
