use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DeviceService;
use crate::models::devices::responses::DeviceResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_device(
    service: &DeviceService,
    school_id: i64,
    device_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_device_by_id(device_id).await {
        Ok(Some(device)) if device.school_id == school_id => Ok(HttpResponse::Ok().json(
            ApiResponse::success(DeviceResponse { device }, "Device retrieved successfully"),
        )),
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::DeviceNotFound,
            "Device not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get device: {e}"),
            )),
        ),
    }
}
