use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::jwt::JwtUtils;

use super::EventService;
use super::broadcaster::{AttendanceEventMessage, ConnectionGuard, EventBroadcaster};

/// EventSource 无法携带请求头，token 通过查询参数传入
#[derive(Debug, serde::Deserialize)]
pub struct SseTokenQuery {
    pub token: Option<String>,
}

/// 心跳注释帧间隔
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub async fn handle_school_stream(
    service: &EventService,
    school_id: i64,
    query: SseTokenQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match authenticate_sse(service, query, request).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    if !user.can_access_school(school_id) {
        warn!(
            "User {} denied SSE stream for school {}",
            user.username, school_id
        );
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::SchoolPermissionDenied,
            "No permission for this school",
        )));
    }

    info!("User {} opened SSE stream for school {}", user.username, school_id);

    let broadcaster = EventBroadcaster::get();
    let receiver = broadcaster.subscribe(school_id);
    let guard = broadcaster.register_connection(school_id);

    Ok(sse_response(receiver, Some(guard)))
}

pub async fn handle_admin_stream(
    service: &EventService,
    query: SseTokenQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match authenticate_sse(service, query, request).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    if user.role != UserRole::SuperAdmin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Access denied.",
        )));
    }

    info!("User {} opened the cross-school SSE stream", user.username);

    let receiver = EventBroadcaster::get().subscribe_admin();

    Ok(sse_response(receiver, None))
}

/// 校验 SSE token 并加载用户，失败时直接返回错误响应
async fn authenticate_sse(
    service: &EventService,
    query: SseTokenQuery,
    request: &HttpRequest,
) -> Result<User, HttpResponse> {
    let token = match query.token {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Missing token query parameter",
            )));
        }
    };

    let claims = JwtUtils::verify_sse_token(&token).map_err(|e| {
        warn!("SSE token verification failed: {}", e);
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Invalid or expired token",
        ))
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Invalid or expired token",
        ))
    })?;

    let storage = service.get_storage(request);
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.status == UserStatus::Active => Ok(user),
        Ok(_) => Err(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Account is not active",
        ))),
        Err(e) => {
            warn!("Failed to load user for SSE stream: {}", e);
            Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to open event stream",
                )),
            )
        }
    }
}

struct StreamState {
    receiver: broadcast::Receiver<AttendanceEventMessage>,
    heartbeat: tokio::time::Interval,
    // 持有守卫直到流被丢弃（客户端断开）
    _guard: Option<ConnectionGuard>,
}

/// 组装 text/event-stream 响应：connected 前导帧 + 事件帧 + 心跳注释帧
fn sse_response(
    receiver: broadcast::Receiver<AttendanceEventMessage>,
    guard: Option<ConnectionGuard>,
) -> HttpResponse {
    let heartbeat =
        tokio::time::interval_at(tokio::time::Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
    let state = StreamState {
        receiver,
        heartbeat,
        _guard: guard,
    };

    let preamble = futures_util::stream::iter(vec![Ok::<web::Bytes, actix_web::Error>(
        web::Bytes::from_static(b"event: connected\ndata: {}\n\n"),
    )]);

    let events = futures_util::stream::unfold(state, |mut state| async move {
        loop {
            tokio::select! {
                _ = state.heartbeat.tick() => {
                    return Some((
                        Ok::<web::Bytes, actix_web::Error>(web::Bytes::from_static(b": heartbeat\n\n")),
                        state,
                    ));
                }
                message = state.receiver.recv() => match message {
                    Ok(event) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(data) => format!("event: attendance\ndata: {data}\n\n"),
                            Err(_) => continue,
                        };
                        return Some((Ok(web::Bytes::from(frame)), state));
                    }
                    // 消费过慢被挤掉的帧直接跳过
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(preamble.chain(events))
}
