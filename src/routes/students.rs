use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::students::requests::{
    ProvisionStudentRequest, StudentExportParams, StudentListParams, TemplateParams,
    UpdateStudentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::StudentService;
use crate::utils::{SafeSchoolIdI64, SafeStudentIdI64};

// 懒加载的全局 STUDENT_SERVICE 实例
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<StudentListParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .list_students(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn export_students(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    query: web::Query<StudentExportParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .export_students(school_id.0, query.into_inner(), &req)
        .await
}

pub async fn download_template(query: web::Query<TemplateParams>) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.download_template(query.into_inner()).await
}

pub async fn import_students(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .import_students(school_id.0, payload, &req)
        .await
}

pub async fn provision_student(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    provision_data: web::Json<ProvisionStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .provision_student(school_id.0, provision_data.into_inner(), &req)
        .await
}

pub async fn get_student(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .get_student(school_id.0, student_id.0, &req)
        .await
}

pub async fn update_student(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    student_id: SafeStudentIdI64,
    update_data: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(school_id.0, student_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_student(
    req: HttpRequest,
    school_id: SafeSchoolIdI64,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .delete_student(school_id.0, student_id.0, &req)
        .await
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schools/{school_id}/students")
            .wrap(middlewares::RequireSchoolScope)
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(list_students)))
            .service(
                web::resource("/export").route(
                    web::get()
                        .to(export_students)
                        .wrap(middlewares::RateLimit::export())
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(web::resource("/template").route(web::get().to(download_template)))
            .service(
                web::resource("/import").route(
                    web::post()
                        .to(import_students)
                        .wrap(middlewares::RateLimit::import())
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/provision").route(
                    web::post()
                        .to(provision_student)
                        // 教师也可以开通单个学生
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{student_id}")
                    .route(web::get().to(get_student))
                    .route(
                        web::put()
                            .to(update_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
