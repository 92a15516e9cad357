use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, warn};

use super::ProvisioningService;
use crate::middlewares::RequireJWT;
use crate::models::provisioning::requests::FinalizeFailureRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::ProvisioningLogData;

pub async fn finalize_failure(
    service: &ProvisioningService,
    provisioning_id: i64,
    finalize_request: FinalizeFailureRequest,
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
                    format!("Failed to finalize provisioning: {e}"),
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

    let reason = finalize_request
        .reason
        .unwrap_or_else(|| "provisioning finalized as failed".to_string());

    match storage
        .finalize_provisioning_failure(provisioning_id, &reason)
        .await
    {
        Ok(provisioning) => {
            if let Err(e) = storage
                .insert_provisioning_log(ProvisioningLogData {
                    school_id: provisioning.school_id,
                    student_id: Some(provisioning.student_id),
                    provisioning_id: Some(provisioning.id),
                    device_id: None,
                    level: "error".to_string(),
                    stage: "finalize".to_string(),
                    status: provisioning.status.to_string(),
                    message: reason.clone(),
                    payload: None,
                })
                .await
            {
                error!("Failed to write provisioning log: {}", e);
            }
            warn!("Provisioning {} finalized: {}", provisioning.id, reason);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                provisioning,
                "Provisioning finalized",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to finalize provisioning: {e}"),
            )),
        ),
    }
}
