use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::imports::requests::DeviceImportCommitRequest;
use crate::models::users::entities::UserRole;
use crate::services::ImportService;
use crate::utils::{SafeImportJobId, SafeSchoolIdI64};

// 懒加载的全局 IMPORT_SERVICE 实例
static IMPORT_SERVICE: Lazy<ImportService> = Lazy::new(ImportService::new_lazy);

pub async fn commit_device_import(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    commit_data: web::Json<DeviceImportCommitRequest>,
) -> ActixResult<HttpResponse> {
    IMPORT_SERVICE
        .commit_device_import(school_id.0, commit_data.into_inner(), &req)
        .await
}

pub async fn get_import_job(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    job_id: SafeImportJobId,
) -> ActixResult<HttpResponse> {
    IMPORT_SERVICE
        .get_import_job(school_id.0, job_id.0, &req)
        .await
}

pub async fn get_import_metrics(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
) -> ActixResult<HttpResponse> {
    IMPORT_SERVICE.get_import_metrics(school_id.0, &req).await
}

// 配置路由
pub fn configure_import_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schools/{school_id}/device-import")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/commit")
                    .route(web::post().to(commit_device_import))
                    .wrap(middlewares::RateLimit::import()),
            ),
    );

    cfg.service(
        web::scope("/api/v1/schools/{school_id}/import-jobs")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/metrics").route(web::get().to(get_import_metrics)))
            .service(web::resource("/{job_id}").route(web::get().to(get_import_job))),
    );
}
