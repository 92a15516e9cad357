use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::common::PaginationInfo;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{requests::ClassListParams, responses::ClassListResponse},
};
use crate::storage::ScopedListQuery;

pub async fn list_classes(
    service: &ClassService,
    school_id: i64,
    query: ClassListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (page, size) = query.pagination.clamped();
    let list_query = ScopedListQuery {
        page: Some(page),
        size: Some(size),
        search: query.search,
        is_active: None,
    };

    match storage
        .list_classes_with_pagination(school_id, list_query)
        .await
    {
        Ok((items, total)) => {
            let total_pages = if total == 0 { 0 } else { (total + size - 1) / size };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ClassListResponse {
                    items,
                    pagination: PaginationInfo {
                        page,
                        page_size: size,
                        total,
                        total_pages,
                    },
                },
                "Class list retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve class list: {e}"),
            )),
        ),
    }
}
