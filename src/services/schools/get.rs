use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::middlewares::RequireJWT;
use crate::models::schools::responses::SchoolResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_school(
    service: &SchoolService,
    school_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 详情对本校管理角色开放，跨校仍然拒绝
    if let Some(user) = RequireJWT::extract_user_claims(request)
        && !user.can_access_school(school_id)
    {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::SchoolPermissionDenied,
            "No permission for this school",
        )));
    }

    let storage = service.get_storage(request);

    match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SchoolResponse {
                school,
                webhook_secret: None,
            },
            "School retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SchoolNotFound,
            "School not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get school: {e}"),
            )),
        ),
    }
}
