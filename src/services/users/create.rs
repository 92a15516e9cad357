use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::users::entities::UserRole;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_username};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    let storage = service.get_storage(request);

    // 校内角色必须挂到一所存在的学校
    if user_data.role.is_school_scoped() {
        let school_id = match user_data.school_id {
            Some(id) => id,
            None => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "school_id is required for this role",
                )));
            }
        };
        match storage.get_school_by_id(school_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::SchoolNotFound,
                    "School not found",
                )));
            }
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("User creation failed: {e}"),
                    )),
                );
            }
        }
    } else if user_data.role == UserRole::SuperAdmin {
        // 超级管理员不属于任何学校
        user_data.school_id = None;
    }

    user_data.password = match hash_password(&user_data.password) {
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

    match storage.create_user(user_data).await {
        Ok(user) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(UserResponse { user }, "用户创建成功"))),
        Err(e) => {
            let msg = format!("User creation failed: {e}");
            error!("{}", msg);
            // 判断是否唯一约束冲突
            if msg.contains("UNIQUE constraint failed") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Username or email already exists",
                )))
            } else {
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)))
            }
        }
    }
}
