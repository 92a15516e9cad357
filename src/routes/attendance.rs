use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{
    ReportQuery, TodayQuery, UpsertAttendanceRequest, WebhookEventRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::SafeSchoolIdI64;

// 懒加载的全局 ATTENDANCE_SERVICE 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn webhook_event(
    req: HttpRequest,
    path: web::Path<(i64, String)>,
    event: web::Json<WebhookEventRequest>,
) -> ActixResult<HttpResponse> {
    let (school_id, direction) = path.into_inner();
    ATTENDANCE_SERVICE
        .handle_webhook(school_id, direction, event.into_inner(), &req)
        .await
}

pub async fn today_attendance(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<TodayQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .today_attendance(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn attendance_report(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .attendance_report(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn export_report(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .export_report(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn upsert_attendance(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    upsert_data: web::Json<UpsertAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .upsert_attendance(school_id.0, upsert_data.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    // 闸机 webhook：无 JWT，按学校 X-Webhook-Secret 鉴权
    cfg.service(
        web::resource("/api/v1/webhook/{school_id}/{direction}")
            .route(web::post().to(webhook_event))
            .wrap(middlewares::RateLimit::webhook()),
    );

    cfg.service(
        web::scope("/api/v1/schools/{school_id}/attendance")
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(upsert_attendance)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(web::resource("/today").route(web::get().to(today_attendance)))
            .service(web::resource("/report").route(web::get().to(attendance_report)))
            .service(
                web::resource("/export").route(
                    web::get()
                        .to(export_report)
                        .wrap(middlewares::RateLimit::export())
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            ),
    );
}
