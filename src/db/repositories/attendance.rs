use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{attendances, meetings, mentees, prelude::*};
use crate::models::AttendanceStatus;

/// Aggregated attendance counters with a percentage rate.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AttendanceStats {
    pub total: u64,
    pub present: u64,
    pub sick: u64,
    pub permission: u64,
    pub absent: u64,
    pub attendance_rate: f64,
}

impl AttendanceStats {
    /// Derives counters from raw status labels. Unknown labels count toward
    /// the total but none of the buckets. The rate is present over total as a
    /// percentage, rounded to two decimals, and 0.0 for an empty input.
    #[must_use]
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = Self {
            total: 0,
            present: 0,
            sick: 0,
            permission: 0,
            absent: 0,
            attendance_rate: 0.0,
        };

        for status in statuses {
            stats.total += 1;
            match status.parse::<AttendanceStatus>() {
                Ok(AttendanceStatus::Hadir) => stats.present += 1,
                Ok(AttendanceStatus::Sakit) => stats.sick += 1,
                Ok(AttendanceStatus::Izin) => stats.permission += 1,
                Ok(AttendanceStatus::Alpa) => stats.absent += 1,
                Err(_) => {}
            }
        }

        if stats.total > 0 {
            #[allow(clippy::cast_precision_loss)]
            let rate = stats.present as f64 / stats.total as f64 * 100.0;
            stats.attendance_rate = (rate * 100.0).round() / 100.0;
        }

        stats
    }
}

pub struct AttendanceEntry {
    pub mentee_id: i32,
    pub status: String,
    pub notes: Option<String>,
}

pub struct AttendanceRepository {
    conn: DatabaseConnection,
}

impl AttendanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_meeting(
        &self,
        meeting_id: i32,
    ) -> Result<Vec<(attendances::Model, Option<mentees::Model>)>> {
        let rows = Attendances::find()
            .filter(attendances::Column::MeetingId.eq(meeting_id))
            .order_by_asc(attendances::Column::MenteeId)
            .find_also_related(Mentees)
            .all(&self.conn)
            .await
            .context("Failed to list attendances for meeting")?;

        Ok(rows)
    }

    /// Records attendance for a meeting. Re-submitting for the same
    /// (meeting, mentee) pair overwrites the previous status and notes
    /// instead of producing a duplicate row.
    pub async fn record_many(&self, meeting_id: i32, entries: &[AttendanceEntry]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models: Vec<attendances::ActiveModel> = entries
            .iter()
            .map(|entry| attendances::ActiveModel {
                meeting_id: Set(meeting_id),
                mentee_id: Set(entry.mentee_id),
                status: Set(entry.status.clone()),
                notes: Set(entry.notes.clone()),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            })
            .collect();

        let count = models.len() as u64;

        Attendances::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    attendances::Column::MeetingId,
                    attendances::Column::MenteeId,
                ])
                .update_columns([
                    attendances::Column::Status,
                    attendances::Column::Notes,
                    attendances::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert attendance rows")?;

        Ok(count)
    }

    /// Attendance counters for one meeting, recomputed from the rows.
    pub async fn stats_for_meeting(&self, meeting_id: i32) -> Result<AttendanceStats> {
        let statuses: Vec<String> = Attendances::find()
            .filter(attendances::Column::MeetingId.eq(meeting_id))
            .select_only()
            .column(attendances::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load attendance statuses")?;

        Ok(AttendanceStats::from_statuses(
            statuses.iter().map(String::as_str),
        ))
    }

    /// Attendance counters for one mentee across every recorded meeting.
    pub async fn stats_for_mentee(&self, mentee_id: i32) -> Result<AttendanceStats> {
        let statuses: Vec<String> = Attendances::find()
            .filter(attendances::Column::MenteeId.eq(mentee_id))
            .select_only()
            .column(attendances::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load attendance statuses")?;

        Ok(AttendanceStats::from_statuses(
            statuses.iter().map(String::as_str),
        ))
    }

    /// Attendance counters across all meetings of a group, skipping meetings
    /// that are in the trash.
    pub async fn stats_for_group(&self, group_id: i32) -> Result<AttendanceStats> {
        let meeting_ids: Vec<i32> = Meetings::find()
            .filter(meetings::Column::DeletedAt.is_null())
            .filter(meetings::Column::GroupId.eq(group_id))
            .select_only()
            .column(meetings::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;

        if meeting_ids.is_empty() {
            return Ok(AttendanceStats::from_statuses(std::iter::empty()));
        }

        let statuses: Vec<String> = Attendances::find()
            .filter(attendances::Column::MeetingId.is_in(meeting_ids))
            .select_only()
            .column(attendances::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load attendance statuses")?;

        Ok(AttendanceStats::from_statuses(
            statuses.iter().map(String::as_str),
        ))
    }

    /// Counters for a set of meetings, used by the monthly report.
    pub async fn stats_for_meetings(&self, meeting_ids: &[i32]) -> Result<AttendanceStats> {
        if meeting_ids.is_empty() {
            return Ok(AttendanceStats::from_statuses(std::iter::empty()));
        }

        let statuses: Vec<String> = Attendances::find()
            .filter(attendances::Column::MeetingId.is_in(meeting_ids.to_vec()))
            .select_only()
            .column(attendances::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load attendance statuses")?;

        Ok(AttendanceStats::from_statuses(
            statuses.iter().map(String::as_str),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_counts_each_bucket() {
        let statuses = [
            "Hadir", "Hadir", "Hadir", "Hadir", "Hadir", "Hadir", "Hadir", "Sakit", "Izin", "Alpa",
        ];
        let stats = AttendanceStats::from_statuses(statuses);

        assert_eq!(stats.total, 10);
        assert_eq!(stats.present, 7);
        assert_eq!(stats.sick, 1);
        assert_eq!(stats.permission, 1);
        assert_eq!(stats.absent, 1);
        assert!((stats.attendance_rate - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_yields_zero_rate() {
        let stats = AttendanceStats::from_statuses(std::iter::empty());
        assert_eq!(stats.total, 0);
        assert!((stats.attendance_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_is_rounded_to_two_decimals() {
        let stats = AttendanceStats::from_statuses(["Hadir", "Hadir", "Alpa"]);
        assert!((stats.attendance_rate - 66.67).abs() < f64::EPSILON);
    }

    #[test]
    fn legacy_alfa_label_counts_as_absent() {
        let stats = AttendanceStats::from_statuses(["alfa", "Hadir"]);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.present, 1);
    }
}
