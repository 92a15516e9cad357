use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DeviceService;
use crate::models::devices::responses::DeviceHealthResponse;
use crate::models::{ApiResponse, ErrorCode};

/// last_seen 在这个窗口内视为在线
const ONLINE_WINDOW_MINUTES: i64 = 10;

pub async fn get_device_health(
    service: &DeviceService,
    school_id: i64,
    device_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let device = match storage.get_device_by_id(device_id).await {
        Ok(Some(device)) if device.school_id == school_id => device,
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
                    format!("Failed to get device health: {e}"),
                )),
            );
        }
    };

    let last_event_at = match storage.get_last_event_time_for_device(device_id).await {
        Ok(last_event_at) => last_event_at,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get device health: {e}"),
                )),
            );
        }
    };

    let now = chrono::Utc::now();
    let online = device
        .last_seen
        .map(|seen| now - seen < chrono::Duration::minutes(ONLINE_WINDOW_MINUTES))
        .unwrap_or(false);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        DeviceHealthResponse {
            device,
            last_event_at,
            online,
        },
        "Device health retrieved successfully",
    )))
}
