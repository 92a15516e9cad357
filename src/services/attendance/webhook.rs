//! 设备 webhook 事件入库
//!
//! 无 JWT，按学校 X-Webhook-Secret 鉴权。event_key 幂等，最小扫描间隔内的
//! 重复刷卡被抑制。入库成功后向 SSE 订阅者广播。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::{debug, info, warn};

use super::AttendanceService;
use crate::models::attendance::{
    entities::EventType,
    requests::WebhookEventRequest,
    responses::WebhookEventResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::events::{AttendanceEventMessage, EventBroadcaster};
use crate::storage::{OrphanEventData, WebhookApplyData, WebhookOutcome};
use crate::utils::date::{date_only_in_zone, minutes_in_zone, parse_timezone};

const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

pub async fn handle_webhook(
    service: &AttendanceService,
    school_id: i64,
    direction: String,
    event: WebhookEventRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let event_type: EventType = match direction.parse() {
        Ok(event_type) => event_type,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("Unknown direction '{direction}', expected 'in' or 'out'"),
            )));
        }
    };

    let school = match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) if school.is_active => school,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SchoolNotFound,
                "School not found",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    // 每校独立 secret，常数时间比较意义不大（secret 为随机长串）
    let provided = request
        .headers()
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided.is_empty() || provided != school.webhook_secret {
        warn!("Webhook auth failed for school {}", school_id);
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::WebhookAuthFailed,
            "Invalid webhook secret",
        )));
    }

    let employee_no = event.employee_no.trim().to_string();
    if employee_no.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "employee_no is required",
        )));
    }

    let timestamp = event.timestamp.unwrap_or_else(Utc::now);

    // 设备可选：未注册的序列号不拒收事件
    let device = match event.device_sn {
        Some(ref device_sn) => match storage.get_device_by_sn(device_sn.trim()).await {
            Ok(Some(device)) if device.school_id == school_id => Some(device),
            Ok(_) => None,
            Err(e) => return Ok(internal_error(e)),
        },
        None => None,
    };
    if let Some(ref device) = device
        && let Err(e) = storage.touch_device_last_seen(device.id, timestamp).await
    {
        warn!("Failed to touch device last_seen: {}", e);
    }

    // 幂等键：设备侧 event_id 优先，否则退化到时间戳
    let dedupe_part = event
        .event_id
        .clone()
        .unwrap_or_else(|| timestamp.to_rfc3339());
    let event_key = format!(
        "{}:{}:{}:{}",
        event.device_sn.as_deref().unwrap_or("unknown"),
        employee_no,
        dedupe_part,
        event_type
    );

    let raw_payload = serde_json::to_string(&serde_json::json!({
        "employee_no": employee_no,
        "device_sn": event.device_sn,
        "timestamp": timestamp,
        "event_id": event.event_id,
        "direction": event_type.to_string(),
    }))
    .ok();

    // 工号没匹配到学生：保留原始事件，不算错误
    let student = match storage
        .get_student_by_device_id(school_id, &employee_no)
        .await
    {
        Ok(Some(student)) if student.is_active => student,
        Ok(_) => {
            debug!(
                "Unmatched webhook scan for school {} (employee_no {})",
                school_id, employee_no
            );
            let stored = storage
                .record_orphan_event(OrphanEventData {
                    school_id,
                    device_id: device.as_ref().map(|d| d.id),
                    event_key,
                    event_type,
                    timestamp,
                    raw_payload,
                })
                .await
                .map_err(|e| {
                    actix_web::error::ErrorInternalServerError(format!(
                        "Failed to record event: {e}"
                    ))
                })?;
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                WebhookEventResponse {
                    accepted: false,
                    reason: Some(if stored {
                        "unmatched_student".to_string()
                    } else {
                        "duplicate_event".to_string()
                    }),
                    student_id: None,
                    status: None,
                },
                "Event recorded",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    let tz = match parse_timezone(&school.timezone) {
        Ok(tz) => tz,
        Err(e) => return Ok(internal_error(e)),
    };
    let date = date_only_in_zone(timestamp, tz);
    let event_minutes = minutes_in_zone(timestamp, tz);

    let class_start = match storage.get_class_by_id(student.class_id).await {
        Ok(Some(class)) => Some(class.start_time),
        Ok(None) => None,
        Err(e) => return Ok(internal_error(e)),
    };

    let data = WebhookApplyData {
        school_id,
        student_id: student.id,
        device_id: device.as_ref().map(|d| d.id),
        event_key,
        event_type,
        timestamp,
        raw_payload,
        date,
        event_minutes,
        class_start,
        late_threshold_minutes: school.late_threshold_minutes,
        absence_cutoff_minutes: school.absence_cutoff_minutes,
        min_scan_interval_seconds: config.attendance.min_scan_interval_seconds,
        max_session_minutes: config.attendance.max_session_minutes,
    };

    match storage.apply_webhook_event(data).await {
        Ok(WebhookOutcome::Applied {
            status,
            late_minutes,
            currently_in_school,
        }) => {
            EventBroadcaster::get().emit(AttendanceEventMessage {
                school_id,
                student_id: student.id,
                full_name: student.full_name.clone(),
                event_type: event_type.to_string(),
                status: status.to_string(),
                late_minutes,
                currently_in_school,
                timestamp,
            });
            info!(
                "Attendance event applied: school {} student {} {} -> {}",
                school_id, student.id, event_type, status
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                WebhookEventResponse {
                    accepted: true,
                    reason: None,
                    student_id: Some(student.id),
                    status: Some(status.to_string()),
                },
                "Event applied",
            )))
        }
        Ok(WebhookOutcome::DuplicateEvent) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            WebhookEventResponse {
                accepted: false,
                reason: Some("duplicate_event".to_string()),
                student_id: Some(student.id),
                status: None,
            },
            "Duplicate event ignored",
        ))),
        Ok(WebhookOutcome::DuplicateScan) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            WebhookEventResponse {
                accepted: false,
                reason: Some("duplicate_scan".to_string()),
                student_id: Some(student.id),
                status: None,
            },
            "Duplicate scan suppressed",
        ))),
        Err(e) => Ok(internal_error(e)),
    }
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to process webhook event: {e}"),
    ))
}
