use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProvisioningService;
use crate::middlewares::RequireJWT;
use crate::models::provisioning::responses::ProvisioningDetailResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_provisioning(
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
                    format!("Failed to get provisioning: {e}"),
                )),
            );
        }
    };

    // 流程按 id 访问，跨校在这里拦
    if let Some(user) = RequireJWT::extract_user_claims(request)
        && !user.can_access_school(provisioning.school_id)
    {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::SchoolPermissionDenied,
            "No permission for this school",
        )));
    }

    let student = match storage.get_student_by_id(provisioning.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get provisioning: {e}"),
                )),
            );
        }
    };

    match storage.get_provisioning_links(provisioning_id).await {
        Ok(links) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ProvisioningDetailResponse {
                provisioning,
                student,
                links,
            },
            "Provisioning retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get provisioning: {e}"),
            )),
        ),
    }
}
