use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::{ApiResponse, ErrorCode};

/// 软删除：只把 is_active 置 false，历史考勤保留
pub async fn delete_student(
    service: &StudentService,
    school_id: i64,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_student_by_id(student_id).await {
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
                    format!("Student deletion failed: {e}"),
                )),
            );
        }
    }

    match storage.deactivate_student(student_id).await {
        Ok(true) => {
            info!("Student {} deactivated in school {}", student_id, school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deactivated")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found or already inactive",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Student deletion failed: {e}"),
            )),
        ),
    }
}
