use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::devices::requests::{
    CreateDeviceRequest, DeviceListParams, UpdateDeviceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::DeviceService;
use crate::utils::{SafeDeviceIdI64, SafeSchoolIdI64};

// 懒加载的全局 DEVICE_SERVICE 实例
static DEVICE_SERVICE: Lazy<DeviceService> = Lazy::new(DeviceService::new_lazy);

pub async fn list_devices(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<DeviceListParams>,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .list_devices(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn create_device(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    device_data: web::Json<CreateDeviceRequest>,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .create_device(school_id.0, device_data.into_inner(), &req)
        .await
}

pub async fn get_device(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    device_id: SafeDeviceIdI64,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .get_device(school_id.0, device_id.0, &req)
        .await
}

pub async fn get_device_health(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    device_id: SafeDeviceIdI64,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .get_device_health(school_id.0, device_id.0, &req)
        .await
}

pub async fn update_device(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    device_id: SafeDeviceIdI64,
    update_data: web::Json<UpdateDeviceRequest>,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .update_device(school_id.0, device_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_device(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    device_id: SafeDeviceIdI64,
) -> ActixResult<HttpResponse> {
    DEVICE_SERVICE
        .delete_device(school_id.0, device_id.0, &req)
        .await
}

// 配置路由
pub fn configure_device_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schools/{school_id}/devices")
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_devices))
                    .route(
                        web::post()
                            .to(create_device)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{device_id}/health").route(web::get().to(get_device_health)),
            )
            .service(
                web::resource("/{device_id}")
                    .route(web::get().to(get_device))
                    .route(
                        web::put()
                            .to(update_device)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_device)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
