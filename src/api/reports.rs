use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, GroupDto, GroupReportDto, MeetingDto, MenteeDto,
    MenteeReportDto, MonthlyReportDto, validation,
};

#[derive(Deserialize)]
pub struct MonthlyReportQuery {
    pub month: u32,
    pub year: i32,
    /// Comma-separated group IDs; empty means every group.
    #[serde(default)]
    pub group_ids: String,
}

fn parse_group_ids(raw: &str) -> Result<Vec<i32>, ApiError> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = part.parse::<i32>().map_err(|_| {
            let mut errors = validation::ValidationErrors::new();
            errors.add("group_ids", format!("ID kelompok '{part}' tidak valid."));
            ApiError::Validation(errors)
        })?;
        ids.push(id);
    }
    Ok(ids)
}

/// GET /reports/monthly?month=&year=&group_ids=
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Json<ApiResponse<MonthlyReportDto>>, ApiError> {
    let mut errors = validation::ValidationErrors::new();
    validation::validate_month(&mut errors, "month", query.month);
    validation::validate_year(&mut errors, "year", query.year);
    errors.into_result()?;

    let group_ids = parse_group_ids(&query.group_ids)?;

    let report = state
        .store()
        .monthly_report(query.month, query.year, &group_ids)
        .await?;

    let groups = report
        .into_iter()
        .map(|entry| GroupReportDto {
            group: GroupDto::from_model(entry.group, entry.mentor.as_ref()),
            meeting_count: entry.meetings.len(),
            meetings: entry
                .meetings
                .into_iter()
                .map(|m| MeetingDto::from_model(m, None))
                .collect(),
            stats: entry.stats,
            mentees: entry
                .mentee_rows
                .into_iter()
                .map(|row| MenteeReportDto {
                    mentee: MenteeDto::from_model(row.mentee, None),
                    stats: row.stats,
                })
                .collect(),
        })
        .collect();

    Ok(Json(ApiResponse::success(MonthlyReportDto {
        month: query.month,
        year: query.year,
        groups,
    })))
}

/// GET /reports/monthly/export/pdf
pub async fn export_pdf() -> Result<Json<ApiResponse<()>>, ApiError> {
    Err(ApiError::not_implemented("PDF export"))
}

/// GET /reports/monthly/export/excel
pub async fn export_excel() -> Result<Json<ApiResponse<()>>, ApiError> {
    Err(ApiError::not_implemented("Excel export"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_ids_parse() {
        assert_eq!(parse_group_ids("").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_group_ids("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_group_ids(" 4 , 5 ").unwrap(), vec![4, 5]);
        assert!(parse_group_ids("1,x").is_err());
    }
}
