use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DeviceService;
use crate::models::{
    ApiResponse, ErrorCode,
    devices::{requests::UpdateDeviceRequest, responses::DeviceResponse},
};

pub async fn update_device(
    service: &DeviceService,
    school_id: i64,
    device_id: i64,
    update_data: UpdateDeviceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_device_by_id(device_id).await {
        Ok(Some(device)) if device.school_id == school_id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::DeviceNotFound,
                "Device not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to update device: {e}"),
                )),
            );
        }
    }

    match storage.update_device(device_id, update_data).await {
        Ok(Some(device)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            DeviceResponse { device },
            "Device updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::DeviceNotFound,
            "Device not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update device: {e}"),
            )),
        ),
    }
}
