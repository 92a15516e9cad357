use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::AttendanceService;
use crate::models::attendance::{
    requests::TodayQuery,
    responses::{TodayAttendanceResponse, TodayAttendanceRow},
    status::compute_effective_status,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::date::{date_only_in_zone, minutes_in_zone, parse_timezone};

pub async fn today_attendance(
    service: &AttendanceService,
    school_id: i64,
    query: TodayQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let school = match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SchoolNotFound,
                "School not found",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    let tz = match parse_timezone(&school.timezone) {
        Ok(tz) => tz,
        Err(e) => return Ok(internal_error(e)),
    };
    let now = Utc::now();
    let date = date_only_in_zone(now, tz);
    let now_minutes = minutes_in_zone(now, tz);

    let rows = match storage
        .list_today_attendance(school_id, &date, query.class_id)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return Ok(internal_error(e)),
    };

    let items = rows
        .into_iter()
        .map(|row| {
            let status = compute_effective_status(
                row.daily.as_ref().map(|d| d.status),
                Some(row.class.start_time.as_str()),
                school.absence_cutoff_minutes,
                now_minutes,
            );
            TodayAttendanceRow {
                student_id: row.student.id,
                full_name: row.student.full_name,
                class_id: row.class.id,
                class_name: row.class.name,
                device_student_id: row.student.device_student_id,
                status,
                late_minutes: row.daily.as_ref().map(|d| d.late_minutes).unwrap_or(0),
                first_scan_time: row.daily.as_ref().and_then(|d| d.first_scan_time),
                last_scan_time: row.daily.as_ref().and_then(|d| d.last_scan_time),
                currently_in_school: row
                    .daily
                    .as_ref()
                    .map(|d| d.currently_in_school)
                    .unwrap_or(false),
                total_time_on_premises: row
                    .daily
                    .as_ref()
                    .map(|d| d.total_time_on_premises)
                    .unwrap_or(0),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TodayAttendanceResponse { date, items },
        "Today attendance retrieved successfully",
    )))
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to get today attendance: {e}"),
    ))
}
