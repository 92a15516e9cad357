use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    students::{requests::UpdateStudentRequest, responses::StudentResponse},
};
use crate::utils::name::{build_full_name, normalize_name_part};

pub async fn update_student(
    service: &StudentService,
    school_id: i64,
    student_id: i64,
    mut update_data: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let existing = match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) if student.school_id == school_id => student,
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
                    format!("Failed to update student: {e}"),
                )),
            );
        }
    };

    // 换班时目标班级必须属于本校
    if let Some(class_id) = update_data.class_id {
        match storage.get_class_by_id(class_id).await {
            Ok(Some(class)) if class.school_id == school_id => {}
            Ok(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ClassNotFound,
                    "Class does not belong to this school",
                )));
            }
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to update student: {e}"),
                    )),
                );
            }
        }
    }

    // 设备工号换绑时检查本校唯一
    if let Some(ref device_student_id) = update_data.device_student_id {
        let device_student_id = device_student_id.trim();
        if device_student_id.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "device_student_id cannot be empty",
            )));
        }
        match storage
            .get_student_by_device_id(school_id, device_student_id)
            .await
        {
            Ok(Some(other)) if other.id != student_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::DuplicateDeviceStudentId,
                    "Another student already uses this device id",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to update student: {e}"),
                    )),
                );
            }
        }
    }

    if let Some(ref first_name) = update_data.first_name {
        update_data.first_name = Some(normalize_name_part(first_name));
    }
    if let Some(ref last_name) = update_data.last_name {
        update_data.last_name = Some(normalize_name_part(last_name));
    }

    // 姓名任一部分变化时重算 full_name
    let full_name = if update_data.first_name.is_some() || update_data.last_name.is_some() {
        let first = update_data
            .first_name
            .as_deref()
            .unwrap_or(&existing.first_name);
        let last = update_data
            .last_name
            .as_deref()
            .unwrap_or(&existing.last_name);
        Some(build_full_name(last, first))
    } else {
        None
    };

    match storage.update_student(student_id, update_data, full_name).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentResponse { student },
            "Student updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update student: {e}"),
            )),
        ),
    }
}
