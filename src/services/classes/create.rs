use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{ClassService, validate_time_of_day};
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{requests::CreateClassRequest, responses::ClassResponse},
};

pub async fn create_class(
    service: &ClassService,
    school_id: i64,
    mut class_data: CreateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    class_data.name = class_data.name.trim().to_string();
    if class_data.name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Class name is required",
        )));
    }

    if let Err(msg) = validate_time_of_day(&class_data.start_time) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if let Some(ref end_time) = class_data.end_time
        && let Err(msg) = validate_time_of_day(end_time)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    // 班级名在本校内唯一
    match storage.get_class_by_name(school_id, &class_data.name).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ClassAlreadyExists,
                "A class with this name already exists in this school",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Class creation failed: {e}"),
                )),
            );
        }
    }

    match storage.create_class(school_id, class_data).await {
        Ok(class) => {
            info!("Class {} created in school {}", class.name, school_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(ClassResponse { class }, "班级创建成功")))
        }
        Err(e) => {
            let msg = format!("Class creation failed: {e}");
            error!("{}", msg);
            if msg.contains("UNIQUE constraint failed") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::ClassAlreadyExists,
                    "A class with this name already exists in this school",
                )))
            } else {
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)))
            }
        }
    }
}
