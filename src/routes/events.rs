use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::EventService;
use crate::services::events::stream::SseTokenQuery;
use crate::utils::SafeSchoolIdI64;

// 懒加载的全局 EVENT_SERVICE 实例
static EVENT_SERVICE: Lazy<EventService> = Lazy::new(EventService::new_lazy);

pub async fn school_stream(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<SseTokenQuery>,
) -> ActixResult<HttpResponse> {
    EVENT_SERVICE
        .school_stream(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn admin_stream(
    req: HttpRequest,
    query: web::Query<SseTokenQuery>,
) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.admin_stream(query.into_inner(), &req).await
}

// 配置路由
//
// EventSource 带不了 Authorization 头，token 走查询参数，
// 鉴权在服务层完成，这里不挂 RequireJWT。
pub fn configure_event_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/schools/{school_id}/events/stream")
            .route(web::get().to(school_stream)),
    );
    cfg.service(web::resource("/api/v1/admin/events/stream").route(web::get().to(admin_stream)));
}
