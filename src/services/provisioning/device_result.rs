use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::ProvisioningService;
use crate::middlewares::RequireJWT;
use crate::models::devices::requests::CreateDeviceRequest;
use crate::models::provisioning::{
    entities::{LinkStatus, Provisioning},
    requests::DeviceResultRequest,
    responses::DeviceResultResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::{DeviceResultData, ProvisioningLogData, Storage};

pub async fn report_device_result(
    service: &ProvisioningService,
    provisioning_id: i64,
    result: DeviceResultRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let provisioning = match storage.get_provisioning_by_id(provisioning_id).await {
        Ok(Some(provisioning)) => provisioning,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ProvisioningNotFound,
                "Provisioning not found",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    if let Some(user) = RequireJWT::extract_user_claims(request)
        && !user.can_access_school(provisioning.school_id)
    {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::SchoolPermissionDenied,
            "No permission for this school",
        )));
    }

    if result.status == LinkStatus::Pending {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Device result status must be success or failed",
        )));
    }

    let auto_register = result.auto_register && config.provisioning.device_auto_register;
    let device_id = match resolve_device(&storage, &provisioning, &result, auto_register).await {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let data = DeviceResultData {
        provisioning_id,
        device_id,
        status: result.status,
        error: result.error.clone(),
        employee_no_on_device: result.employee_no_on_device,
    };

    match storage.apply_device_result(data).await {
        Ok((provisioning, link)) => {
            let level = if result.status == LinkStatus::Failed {
                "error"
            } else {
                "info"
            };
            if let Err(e) = storage
                .insert_provisioning_log(ProvisioningLogData {
                    school_id: provisioning.school_id,
                    student_id: Some(provisioning.student_id),
                    provisioning_id: Some(provisioning.id),
                    device_id: Some(device_id),
                    level: level.to_string(),
                    stage: "device_result".to_string(),
                    status: result.status.to_string(),
                    message: result
                        .error
                        .unwrap_or_else(|| format!("device {} reported {}", device_id, result.status)),
                    payload: None,
                })
                .await
            {
                error!("Failed to write provisioning log: {}", e);
            }
            info!(
                "Device {} reported {} for provisioning {} (aggregate {})",
                device_id, link.status, provisioning.id, provisioning.status
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                DeviceResultResponse { provisioning, link },
                "Device result applied",
            )))
        }
        Err(e) => Ok(internal_error(e)),
    }
}

/// 设备三选一定位：id / 序列号 / 唯一名称
async fn resolve_device(
    storage: &std::sync::Arc<dyn Storage>,
    provisioning: &Provisioning,
    result: &DeviceResultRequest,
    auto_register: bool,
) -> Result<i64, HttpResponse> {
    if let Some(device_id) = result.device_id {
        return match storage.get_device_by_id(device_id).await {
            Ok(Some(device)) if device.school_id == provisioning.school_id => Ok(device.id),
            Ok(_) => Err(device_not_found()),
            Err(e) => Err(internal_error(e)),
        };
    }

    if let Some(ref device_sn) = result.device_sn {
        match storage.get_device_by_sn(device_sn).await {
            Ok(Some(device)) if device.school_id == provisioning.school_id => {
                return Ok(device.id);
            }
            Ok(Some(_)) => return Err(device_not_found()),
            Ok(None) if auto_register => {
                // 代理先见到设备的场景：按序列号注册
                warn!(
                    "Auto-registering device {} for school {}",
                    device_sn, provisioning.school_id
                );
                return match storage
                    .create_device(
                        provisioning.school_id,
                        CreateDeviceRequest {
                            device_sn: device_sn.clone(),
                            name: device_sn.clone(),
                            location: None,
                        },
                    )
                    .await
                {
                    Ok(device) => Ok(device.id),
                    Err(e) => Err(internal_error(e)),
                };
            }
            Ok(None) => return Err(device_not_found()),
            Err(e) => return Err(internal_error(e)),
        }
    }

    if let Some(ref name) = result.device_name {
        let matches = match storage
            .find_devices_by_name(provisioning.school_id, name.trim())
            .await
        {
            Ok(matches) => matches,
            Err(e) => return Err(internal_error(e)),
        };
        return match matches.len() {
            0 => Err(device_not_found()),
            1 => Ok(matches[0].id),
            _ => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::DeviceNameAmbiguous,
                format!("Device name '{}' matches {} devices", name.trim(), matches.len()),
            ))),
        };
    }

    Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        "One of device_id, device_sn or device_name is required",
    )))
}

fn device_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::DeviceNotFound,
        "Device not found in this school",
    ))
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to apply device result: {e}"),
    ))
}
