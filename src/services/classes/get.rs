use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::classes::responses::ClassResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_class(
    service: &ClassService,
    school_id: i64,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_class_by_id(class_id).await {
        // 其他学校的班级按不存在处理
        Ok(Some(class)) if class.school_id == school_id => Ok(HttpResponse::Ok().json(
            ApiResponse::success(ClassResponse { class }, "Class retrieved successfully"),
        )),
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get class: {e}"),
            )),
        ),
    }
}
