use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    students::requests::{StudentListParams, StudentListQuery},
};

pub async fn list_students(
    service: &StudentService,
    school_id: i64,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (page, size) = query.pagination.clamped();
    let list_query = StudentListQuery {
        page: Some(page),
        size: Some(size),
        class_id: query.class_id,
        search: query.search,
        is_active: query.is_active,
    };

    match storage
        .list_students_with_pagination(school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student list retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve student list: {e}"),
            )),
        ),
    }
}
