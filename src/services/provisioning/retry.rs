use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ProvisioningService;
use crate::middlewares::RequireJWT;
use crate::models::provisioning::{requests::RetryRequest, responses::RetryResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::ProvisioningLogData;

pub async fn retry_provisioning(
    service: &ProvisioningService,
    provisioning_id: i64,
    retry_request: RetryRequest,
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
                    format!("Failed to retry provisioning: {e}"),
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
        .retry_provisioning_links(provisioning_id, retry_request.device_ids)
        .await
    {
        Ok((provisioning, reset_count)) => {
            if let Err(e) = storage
                .insert_provisioning_log(ProvisioningLogData {
                    school_id: provisioning.school_id,
                    student_id: Some(provisioning.student_id),
                    provisioning_id: Some(provisioning.id),
                    device_id: None,
                    level: "info".to_string(),
                    stage: "retry".to_string(),
                    status: provisioning.status.to_string(),
                    message: format!("{reset_count} link(s) reset to pending"),
                    payload: None,
                })
                .await
            {
                error!("Failed to write provisioning log: {}", e);
            }
            info!(
                "Provisioning {} retried, {} link(s) reset",
                provisioning.id, reset_count
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RetryResponse {
                    provisioning,
                    reset_count,
                },
                "Provisioning retry started",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retry provisioning: {e}"),
            )),
        ),
    }
}
