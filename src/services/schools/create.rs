use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::SchoolService;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::models::{
    ApiResponse, ErrorCode,
    schools::{requests::CreateSchoolRequest, responses::SchoolResponse},
};
use crate::storage::CreateSchoolData;
use crate::utils::date::parse_timezone;
use crate::utils::password::hash_password;
use crate::utils::random_code::webhook_secret;

/// 默认时区，学校未指定时使用
const DEFAULT_TIMEZONE: &str = "Asia/Tashkent";

pub async fn create_school(
    service: &SchoolService,
    school_data: CreateSchoolRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let name = school_data.name.trim().to_string();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "School name is required",
        )));
    }

    let timezone = school_data
        .timezone
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    if parse_timezone(&timezone).is_err() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Unknown IANA timezone: {timezone}"),
        )));
    }

    // 学校名全局唯一
    match storage.get_school_by_name(&name).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::Conflict,
                "A school with this name already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("School creation failed: {e}"),
                )),
            );
        }
    }

    let secret = webhook_secret();
    let data = CreateSchoolData {
        name,
        timezone,
        late_threshold_minutes: school_data
            .late_threshold_minutes
            .unwrap_or(config.attendance.default_late_threshold_minutes),
        absence_cutoff_minutes: school_data
            .absence_cutoff_minutes
            .unwrap_or(config.attendance.default_absence_cutoff_minutes),
        webhook_secret: secret.clone(),
    };

    let school = match storage.create_school(data).await {
        Ok(school) => school,
        Err(e) => {
            error!("School creation failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("School creation failed: {e}"),
                )),
            );
        }
    };

    // 可选：同时创建该校的管理员账号
    if let Some(admin) = school_data.admin {
        let password_hash = match hash_password(&admin.password) {
            Ok(hash) => hash,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        };
        let display_name = admin
            .display_name
            .unwrap_or_else(|| admin.username.clone());
        let create_request = CreateUserRequest {
            username: admin.username,
            email: admin.email,
            password: password_hash,
            role: UserRole::SchoolAdmin,
            school_id: Some(school.id),
            display_name,
        };
        match storage.create_user(create_request).await {
            Ok(user) => info!(
                "Seeded school admin {} for school {}",
                user.username, school.name
            ),
            Err(e) => {
                let msg = format!("Failed to seed school admin: {e}");
                error!("{}", msg);
                if msg.contains("UNIQUE constraint failed") {
                    return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                        ErrorCode::UserAlreadyExists,
                        "Admin username or email already exists",
                    )));
                }
                return Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)));
            }
        }
    }

    info!("School {} created", school.name);

    // webhook secret 仅在创建响应里返回一次
    Ok(HttpResponse::Created().json(ApiResponse::success(
        SchoolResponse {
            school,
            webhook_secret: Some(secret),
        },
        "学校创建成功",
    )))
}
