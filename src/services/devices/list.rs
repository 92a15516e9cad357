use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DeviceService;
use crate::models::common::PaginationInfo;
use crate::models::{
    ApiResponse, ErrorCode,
    devices::{requests::DeviceListParams, responses::DeviceListResponse},
};
use crate::storage::ScopedListQuery;

pub async fn list_devices(
    service: &DeviceService,
    school_id: i64,
    query: DeviceListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (page, size) = query.pagination.clamped();
    let list_query = ScopedListQuery {
        page: Some(page),
        size: Some(size),
        search: query.search,
        is_active: query.is_active,
    };

    match storage
        .list_devices_with_pagination(school_id, list_query)
        .await
    {
        Ok((items, total)) => {
            let total_pages = if total == 0 { 0 } else { (total + size - 1) / size };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                DeviceListResponse {
                    items,
                    pagination: PaginationInfo {
                        page,
                        page_size: size,
                        total,
                        total_pages,
                    },
                },
                "Device list retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve device list: {e}"),
            )),
        ),
    }
}
