use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ImportRuntime, ImportService};
use crate::models::imports::responses::{ImportJobResponse, ImportMetricsResponse};
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_import_job(
    _service: &ImportService,
    school_id: i64,
    job_id: String,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 其他学校的任务一律按不存在处理
    match ImportRuntime::get().get_job(&job_id) {
        Some(job) if job.school_id == school_id => Ok(HttpResponse::Ok().json(
            ApiResponse::success(ImportJobResponse { job }, "Import job retrieved successfully"),
        )),
        _ => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ImportJobNotFound,
            "Import job not found",
        ))),
    }
}

pub async fn get_import_metrics(
    _service: &ImportService,
    school_id: i64,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let metrics = ImportRuntime::get().metrics(school_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ImportMetricsResponse { metrics },
        "Import metrics retrieved successfully",
    )))
}
