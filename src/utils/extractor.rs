use std::future::{Ready, ready};

use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(message: &str) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(message.to_string(), response).into()
}

/// 定义一个从路径参数安全提取 i64 的 extractor
///
/// 提取失败时返回统一的 400 响应，而不是 actix 默认的纯文本错误
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                std::future::ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => Err($crate::utils::extractor::invalid_id_error($param)),
                })
            }
        }
    };
}

#[doc(hidden)]
pub fn invalid_id_error(param: &str) -> actix_web::Error {
    bad_path_param(&format!("Invalid path parameter: {param}"))
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeSchoolIdI64, "school_id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeDeviceIdI64, "device_id");
define_safe_i64_extractor!(SafeProvisioningIdI64, "provisioning_id");

/// 导入任务 ID 是 UUID 字符串，不做数字解析，仅做格式约束
pub struct SafeImportJobId(pub String);

impl FromRequest for SafeImportJobId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .match_info()
            .get("job_id")
            .filter(|raw| !raw.is_empty() && raw.len() <= 64)
            .filter(|raw| {
                raw.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
            })
            .map(|raw| raw.to_string());

        ready(match parsed {
            Some(id) => Ok(SafeImportJobId(id)),
            None => Err(bad_path_param("Invalid path parameter: job_id")),
        })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn job_id_charset() {
        let ok = "550e8400-e29b-41d4-a716-446655440000";
        assert!(ok.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        let bad = "../etc/passwd";
        assert!(!bad.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
