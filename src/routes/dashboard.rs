use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::DashboardService;
use crate::utils::SafeSchoolIdI64;

// 懒加载的全局 DASHBOARD_SERVICE 实例
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn school_dashboard(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.school_dashboard(school_id.0, &req).await
}

// 配置路由：门卫角色也能看
pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schools/{school_id}/dashboard")
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(school_dashboard))),
    );
}
