use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::models::common::PaginationInfo;
use crate::models::{
    ApiResponse, ErrorCode,
    schools::{requests::SchoolListParams, responses::SchoolListResponse},
};
use crate::storage::SchoolListQuery;

pub async fn list_schools(
    service: &SchoolService,
    query: SchoolListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let page = query.pagination.page;
    let size = query.pagination.size;
    let list_query = SchoolListQuery {
        page: Some(page),
        size: Some(size),
        search: query.search,
        is_active: query.is_active,
    };

    match storage.list_schools_with_pagination(list_query).await {
        Ok((items, total)) => {
            let (page, size) = (page.max(1), size.clamp(1, 200));
            let total_pages = if total == 0 { 0 } else { (total + size - 1) / size };
            let response = SchoolListResponse {
                items,
                pagination: PaginationInfo {
                    page,
                    page_size: size,
                    total,
                    total_pages,
                },
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "School list retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve school list: {e}"),
            )),
        ),
    }
}
