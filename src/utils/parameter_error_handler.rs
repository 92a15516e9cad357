use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(message: String) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// JSON 请求体反序列化错误 -> 统一 400 响应
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid JSON body: {e}"),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "JSON body too large".to_string()
        }
        other => format!("Invalid JSON body: {other}"),
    };
    bad_request(message)
}

/// 查询参数反序列化错误 -> 统一 400 响应
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query payload error on {}: {}", req.path(), err);
    bad_request(format!("Invalid query parameters: {err}"))
}

/// 路径参数反序列化错误 -> 统一 400 响应
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("Path parameter error on {}: {}", req.path(), err);
    bad_request(format!("Invalid path parameters: {err}"))
}
