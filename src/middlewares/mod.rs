//! HTTP 中间件
//!
//! - `require_jwt`: JWT 认证，把 User 写入请求扩展
//! - `require_role`: 平台角色校验，需在 RequireJWT 之后
//! - `require_school_scope`: 学校范围校验，需在 RequireJWT 之后
//! - `rate_limit`: 基于 IP/用户的速率限制

pub mod rate_limit;
pub mod require_jwt;
pub mod require_role;
pub mod require_school_scope;

pub use rate_limit::RateLimit;
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;
pub use require_school_scope::RequireSchoolScope;

use crate::models::{ApiResponse, ErrorCode};
use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

/// 统一的中间件错误响应
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()>::error_empty(code, message))
}
