use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::requests::LoginRequest;
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login(
    req: HttpRequest,
    login_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(login_data.into_inner(), &req).await
}

pub async fn refresh_token(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh_token(&request).await
}

pub async fn logout(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&request).await
}

pub async fn profile(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.profile(&request).await
}

pub async fn sse_token(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.sse_token(&request).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(
                web::resource("/login")
                    .route(web::post().to(login))
                    .wrap(middlewares::RateLimit::login()),
            )
            .service(
                web::resource("/refresh")
                    .route(web::post().to(refresh_token))
                    .wrap(middlewares::RateLimit::refresh_token()),
            )
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/logout", web::post().to(logout))
                    .route("/me", web::get().to(profile))
                    // SSE 用短时效 token，EventSource 无法带 Authorization 头
                    .route("/sse-token", web::post().to(sse_token)),
            ),
    );
}
