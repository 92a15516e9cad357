use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProvisioningService;
use crate::middlewares::RequireJWT;
use crate::models::provisioning::responses::ProvisioningLogsResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 单次最多返回的日志行数
const LOG_LIMIT: u64 = 200;

pub async fn get_provisioning_logs(
    service: &ProvisioningService,
    provisioning_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let provisioning = match storage.get_provisioning_by_id(provisioning_id).await {
        Ok(Some(provisioning)) => provisioning,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ProvisioningNotFound,
                "Provisioning not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get provisioning logs: {e}"),
                )),
            );
        }
    };

    if let Some(user) = RequireJWT::extract_user_claims(request)
        && !user.can_access_school(provisioning.school_id)
    {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::SchoolPermissionDenied,
            "No permission for this school",
        )));
    }

    match storage
        .list_provisioning_logs(provisioning_id, LOG_LIMIT)
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ProvisioningLogsResponse { items },
            "Provisioning logs retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get provisioning logs: {e}"),
            )),
        ),
    }
}
