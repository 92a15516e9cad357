use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::DeviceService;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_device(
    service: &DeviceService,
    school_id: i64,
    device_id: i64,
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
                    format!("Device deletion failed: {e}"),
                )),
            );
        }
    }

    match storage.delete_device(device_id).await {
        Ok(true) => {
            info!("Device {} deleted from school {}", device_id, school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Device deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::DeviceNotFound,
            "Device not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Device deletion failed: {e}"),
            )),
        ),
    }
}
