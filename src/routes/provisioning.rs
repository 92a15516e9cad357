use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::provisioning::requests::{
    DeviceResultRequest, FinalizeFailureRequest, RetryRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ProvisioningService;
use crate::utils::SafeIDI64;

// 懒加载的全局 PROVISIONING_SERVICE 实例
static PROVISIONING_SERVICE: Lazy<ProvisioningService> = Lazy::new(ProvisioningService::new_lazy);

pub async fn get_provisioning(
    req: HttpRequest,
    provisioning_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    PROVISIONING_SERVICE
        .get_provisioning(provisioning_id.0, &req)
        .await
}

pub async fn report_device_result(
    req: HttpRequest,
    provisioning_id: SafeIDI64,
    result: web::Json<DeviceResultRequest>,
) -> ActixResult<HttpResponse> {
    PROVISIONING_SERVICE
        .report_device_result(provisioning_id.0, result.into_inner(), &req)
        .await
}

pub async fn retry_provisioning(
    req: HttpRequest,
    provisioning_id: SafeIDI64,
    retry_data: web::Json<RetryRequest>,
) -> ActixResult<HttpResponse> {
    PROVISIONING_SERVICE
        .retry_provisioning(provisioning_id.0, retry_data.into_inner(), &req)
        .await
}

pub async fn finalize_failure(
    req: HttpRequest,
    provisioning_id: SafeIDI64,
    finalize_data: web::Json<FinalizeFailureRequest>,
) -> ActixResult<HttpResponse> {
    PROVISIONING_SERVICE
        .finalize_failure(provisioning_id.0, finalize_data.into_inner(), &req)
        .await
}

pub async fn get_provisioning_logs(
    req: HttpRequest,
    provisioning_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    PROVISIONING_SERVICE
        .get_provisioning_logs(provisioning_id.0, &req)
        .await
}

// 配置路由：流程按 id 访问，学校范围在服务层校验
pub fn configure_provisioning_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/provisioning/{id}")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(get_provisioning)))
            .service(web::resource("/device-result").route(web::post().to(report_device_result)))
            .service(web::resource("/retry").route(web::post().to(retry_provisioning)))
            .service(web::resource("/finalize-failure").route(web::post().to(finalize_failure)))
            .service(web::resource("/logs").route(web::get().to(get_provisioning_logs))),
    );
}
