use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ClassService, validate_time_of_day};
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{requests::UpdateClassRequest, responses::ClassResponse},
};

pub async fn update_class(
    service: &ClassService,
    school_id: i64,
    class_id: i64,
    update_data: UpdateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 先确认班级属于本校
    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) if class.school_id == school_id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to update class: {e}"),
                )),
            );
        }
    }

    if let Some(ref start_time) = update_data.start_time
        && let Err(msg) = validate_time_of_day(start_time)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if let Some(ref end_time) = update_data.end_time
        && let Err(msg) = validate_time_of_day(end_time)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    // 改名时检查本校唯一
    if let Some(ref name) = update_data.name {
        match storage.get_class_by_name(school_id, name.trim()).await {
            Ok(Some(existing)) if existing.id != class_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::ClassAlreadyExists,
                    "A class with this name already exists in this school",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to update class: {e}"),
                    )),
                );
            }
        }
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassResponse { class },
            "Class updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update class: {e}"),
            )),
        ),
    }
}
