use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use tracing::info;

use super::AttendanceService;
use crate::models::attendance::{
    requests::UpsertAttendanceRequest, responses::DailyAttendanceResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::ManualAttendanceData;

/// 管理员手工修正（请假、补卡等）
pub async fn upsert_attendance(
    service: &AttendanceService,
    school_id: i64,
    upsert_request: UpsertAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if NaiveDate::parse_from_str(&upsert_request.date, "%Y-%m-%d").is_err() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "date must be in YYYY-MM-DD format",
        )));
    }

    // 学生必须属于本校
    match storage.get_student_by_id(upsert_request.student_id).await {
        Ok(Some(student)) if student.school_id == school_id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to upsert attendance: {e}"),
                )),
            );
        }
    }

    let data = ManualAttendanceData {
        school_id,
        student_id: upsert_request.student_id,
        date: upsert_request.date,
        status: upsert_request.status,
        late_minutes: upsert_request.late_minutes.unwrap_or(0).max(0),
    };

    match storage.upsert_manual_attendance(data).await {
        Ok(record) => {
            info!(
                "Manual attendance set: school {} student {} {} -> {}",
                school_id, record.student_id, record.date, record.status
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                DailyAttendanceResponse { record },
                "考勤记录已更新",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to upsert attendance: {e}"),
            )),
        ),
    }
}
