/*!
 * 学校范围访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用，校验当前用户是否可以访问
 * 路径参数 `school_id` 指向的学校。super_admin 跨学校放行，其余角色
 * 只能访问自己所属的学校。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/api/v1/schools/{school_id}")
 *     .wrap(RequireSchoolScope)
 *     .wrap(RequireJWT)
 *     .route("/students", web::get().to(list_students_handler))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{ErrorCode, users::entities::User};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireSchoolScope;

impl<S, B> Transform<S, ServiceRequest> for RequireSchoolScope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSchoolScopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSchoolScopeMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSchoolScopeMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSchoolScopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            // 1. 校验用户信息
            let user_claims = req.extensions().get::<User>().cloned();
            let user = match user_claims {
                Some(user) => user,
                None => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Unauthorized: missing user claims",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 2. 校验 school_id 路径参数
            let school_id = match req
                .match_info()
                .get("school_id")
                .and_then(|s| s.parse::<i64>().ok())
            {
                Some(id) if id > 0 => id,
                _ => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::BAD_REQUEST,
                            ErrorCode::BadRequest,
                            "Missing or invalid school_id",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 3. 范围校验（super_admin 跨学校）
            if user.can_access_school(school_id) {
                let res = srv.call(req).await?.map_into_left_body();
                Ok(res)
            } else {
                info!(
                    "School scope denied for user {} (school: {:?}, requested: {})",
                    user.id, user.school_id, school_id
                );
                Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        ErrorCode::SchoolPermissionDenied,
                        "No permission for this school",
                    )
                    .map_into_right_body(),
                ))
            }
        })
    }
}
