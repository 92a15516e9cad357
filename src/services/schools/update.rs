use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SchoolService;
use crate::models::{
    ApiResponse, ErrorCode,
    schools::{requests::UpdateSchoolRequest, responses::SchoolResponse},
};
use crate::utils::date::parse_timezone;
use crate::utils::random_code::webhook_secret;

pub async fn update_school(
    service: &SchoolService,
    school_id: i64,
    update_data: UpdateSchoolRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(ref timezone) = update_data.timezone
        && parse_timezone(timezone).is_err()
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Unknown IANA timezone: {timezone}"),
        )));
    }

    // 改名时检查全局唯一
    if let Some(ref name) = update_data.name {
        match storage.get_school_by_name(name.trim()).await {
            Ok(Some(existing)) if existing.id != school_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::Conflict,
                    "A school with this name already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to update school: {e}"),
                    )),
                );
            }
        }
    }

    let new_secret = if update_data.rotate_webhook_secret.unwrap_or(false) {
        Some(webhook_secret())
    } else {
        None
    };

    match storage
        .update_school(school_id, update_data, new_secret.clone())
        .await
    {
        Ok(Some(school)) => {
            if new_secret.is_some() {
                info!("Webhook secret rotated for school {}", school.name);
            }
            // 轮换出的新 secret 只在本次响应返回
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SchoolResponse {
                    school,
                    webhook_secret: new_secret,
                },
                "School updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SchoolNotFound,
            "School not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update school: {e}"),
            )),
        ),
    }
}
