use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::DeviceService;
use crate::models::{
    ApiResponse, ErrorCode,
    devices::{requests::CreateDeviceRequest, responses::DeviceResponse},
};

pub async fn create_device(
    service: &DeviceService,
    school_id: i64,
    mut device_data: CreateDeviceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    device_data.device_sn = device_data.device_sn.trim().to_string();
    device_data.name = device_data.name.trim().to_string();
    if device_data.device_sn.is_empty() || device_data.name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "device_sn and name are required",
        )));
    }

    // 序列号全局唯一
    match storage.get_device_by_sn(&device_data.device_sn).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::DeviceSnAlreadyExists,
                "A device with this serial number already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Device creation failed: {e}"),
                )),
            );
        }
    }

    match storage.create_device(school_id, device_data).await {
        Ok(device) => {
            info!("Device {} registered in school {}", device.device_sn, school_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(DeviceResponse { device }, "设备注册成功")))
        }
        Err(e) => {
            let msg = format!("Device creation failed: {e}");
            error!("{}", msg);
            if msg.contains("UNIQUE constraint failed") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::DeviceSnAlreadyExists,
                    "A device with this serial number already exists",
                )))
            } else {
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)))
            }
        }
    }
}
