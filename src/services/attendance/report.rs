use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::AttendanceService;
use crate::models::attendance::{
    entities::{AttendanceStatus, DailyAttendance},
    requests::ReportQuery,
    responses::{AttendanceReportResponse, ReportDayRow},
};
use crate::models::{ApiResponse, ErrorCode};

pub async fn attendance_report(
    service: &AttendanceService,
    school_id: i64,
    query: ReportQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(response) = validate_range(&query) {
        return Ok(response);
    }

    match storage
        .list_attendance_range(school_id, &query.from, &query.to, query.class_id)
        .await
    {
        Ok(records) => {
            let days = aggregate_days(&records);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceReportResponse {
                    from: query.from,
                    to: query.to,
                    days,
                },
                "Attendance report retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to build attendance report: {e}"),
            )),
        ),
    }
}

pub(super) fn validate_range(query: &ReportQuery) -> Result<(), HttpResponse> {
    let from = NaiveDate::parse_from_str(&query.from, "%Y-%m-%d");
    let to = NaiveDate::parse_from_str(&query.to, "%Y-%m-%d");
    match (from, to) {
        (Ok(from), Ok(to)) if from <= to => Ok(()),
        (Ok(_), Ok(_)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "'from' must not be after 'to'",
        ))),
        _ => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Dates must be in YYYY-MM-DD format",
        ))),
    }
}

/// 按日期聚合状态计数
pub(super) fn aggregate_days(records: &[DailyAttendance]) -> Vec<ReportDayRow> {
    let mut by_date: BTreeMap<&str, ReportDayRow> = BTreeMap::new();

    for record in records {
        let row = by_date
            .entry(record.date.as_str())
            .or_insert_with(|| ReportDayRow {
                date: record.date.clone(),
                present: 0,
                late: 0,
                absent: 0,
                excused: 0,
            });
        match record.status {
            AttendanceStatus::Present => row.present += 1,
            AttendanceStatus::Late => row.late += 1,
            AttendanceStatus::Absent => row.absent += 1,
            AttendanceStatus::Excused => row.excused += 1,
        }
    }

    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(date: &str, status: AttendanceStatus) -> DailyAttendance {
        DailyAttendance {
            id: 0,
            school_id: 1,
            student_id: 1,
            date: date.to_string(),
            status,
            late_minutes: 0,
            first_scan_time: None,
            last_scan_time: None,
            last_in_time: None,
            last_out_time: None,
            currently_in_school: false,
            scan_count: 0,
            total_time_on_premises: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn aggregates_by_date_sorted() {
        let records = vec![
            record("2026-03-03", AttendanceStatus::Late),
            record("2026-03-02", AttendanceStatus::Present),
            record("2026-03-02", AttendanceStatus::Present),
            record("2026-03-02", AttendanceStatus::Excused),
            record("2026-03-03", AttendanceStatus::Absent),
        ];
        let days = aggregate_days(&records);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2026-03-02");
        assert_eq!(days[0].present, 2);
        assert_eq!(days[0].excused, 1);
        assert_eq!(days[1].late, 1);
        assert_eq!(days[1].absent, 1);
    }

    #[test]
    fn range_validation() {
        let ok = ReportQuery {
            from: "2026-03-01".to_string(),
            to: "2026-03-05".to_string(),
            class_id: None,
        };
        assert!(validate_range(&ok).is_ok());

        let reversed = ReportQuery {
            from: "2026-03-05".to_string(),
            to: "2026-03-01".to_string(),
            class_id: None,
        };
        assert!(validate_range(&reversed).is_err());

        let garbage = ReportQuery {
            from: "03/01/2026".to_string(),
            to: "2026-03-05".to_string(),
            class_id: None,
        };
        assert!(validate_range(&garbage).is_err());
    }
}
