//! 下发开通
//!
//! 把学生档案写库并发起向闸机设备下发的流程。request_id 幂等重放，
//! 设备学号缺省时自动生成，碰撞重试。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::StudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    students::{requests::ProvisionStudentRequest, responses::ProvisionStudentResponse},
};
use crate::storage::{ProvisionStartData, ProvisioningLogData, StudentUpsertData};
use crate::utils::name::{build_full_name, normalize_name_part};
use crate::utils::random_code::numeric_code;

/// 自动生成设备学号时的碰撞重试上限
const ID_GENERATION_ATTEMPTS: usize = 10;

pub async fn provision_student(
    service: &StudentService,
    school_id: i64,
    provision_request: ProvisionStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. request_id 幂等重放：同键请求返回已有流程
    if let Some(ref request_id) = provision_request.request_id {
        match storage
            .find_provisioning_by_request_id(school_id, request_id)
            .await
        {
            Ok(Some(provisioning)) => {
                let student = match storage.get_student_by_id(provisioning.student_id).await {
                    Ok(Some(student)) => student,
                    Ok(None) => {
                        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                            ErrorCode::StudentNotFound,
                            "Student not found for replayed provisioning",
                        )));
                    }
                    Err(e) => return Ok(internal_error(e)),
                };
                let links = match storage.get_provisioning_links(provisioning.id).await {
                    Ok(links) => links,
                    Err(e) => return Ok(internal_error(e)),
                };
                info!(
                    "Provisioning replayed idempotently for school {} (request_id {})",
                    school_id, request_id
                );
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    ProvisionStudentResponse {
                        student,
                        provisioning_id: provisioning.id,
                        device_count: links.len() as i64,
                        idempotent: true,
                    },
                    "Provisioning already started",
                )));
            }
            Ok(None) => {}
            Err(e) => return Ok(internal_error(e)),
        }
    }

    // 2. 姓名校验
    let first_name = normalize_name_part(&provision_request.first_name);
    let last_name = normalize_name_part(&provision_request.last_name);
    if first_name.is_empty() || last_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "first_name and last_name are required",
        )));
    }

    // 3. 班级必须属于本校
    match storage.get_class_by_id(provision_request.class_id).await {
        Ok(Some(class)) if class.school_id == school_id => {}
        Ok(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class does not belong to this school",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    }

    // 4. 同班重名保护，force_duplicate_name 放行
    if !provision_request.force_duplicate_name {
        match storage
            .find_duplicate_name_in_class(
                school_id,
                provision_request.class_id,
                &first_name,
                &last_name,
            )
            .await
        {
            Ok(Some(existing)) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::DuplicateStudentName,
                    format!(
                        "Student {} already exists in this class (id {}), set force_duplicate_name to proceed",
                        existing.full_name, existing.id
                    ),
                )));
            }
            Ok(None) => {}
            Err(e) => return Ok(internal_error(e)),
        }
    }

    // 5. 设备学号：指定则校验，缺省则生成（碰撞重试）
    let device_student_id = match provision_request.device_student_id {
        Some(id) => {
            let id = id.trim().to_string();
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "device_student_id must be numeric",
                )));
            }
            id
        }
        None => {
            match generate_device_student_id(
                &storage,
                school_id,
                config.provisioning.device_student_id_length,
            )
            .await
            {
                Ok(id) => id,
                Err(response) => return Ok(response),
            }
        }
    };

    // 6. 目标设备：显式列表或全部启用设备
    let device_ids = match provision_request.device_ids {
        Some(ids) if !ids.is_empty() => {
            let known = match storage.filter_device_ids_in_school(school_id, &ids).await {
                Ok(known) => known,
                Err(e) => return Ok(internal_error(e)),
            };
            if known.len() != ids.len() {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::DeviceNotFound,
                    "Some target devices do not belong to this school",
                )));
            }
            known
        }
        _ => match storage.list_active_devices(school_id).await {
            Ok(devices) => devices.into_iter().map(|d| d.id).collect(),
            Err(e) => return Ok(internal_error(e)),
        },
    };

    if device_ids.is_empty() {
        warn!("Provisioning rejected for school {}: no target devices", school_id);
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::DeviceNotFound,
            "No target devices to provision to",
        )));
    }

    // 7. 事务内：学生 upsert + 流程行 + 设备链路
    let full_name = build_full_name(&last_name, &first_name);
    let data = ProvisionStartData {
        school_id,
        student: StudentUpsertData {
            class_id: provision_request.class_id,
            first_name,
            last_name,
            father_name: provision_request
                .father_name
                .map(|n| normalize_name_part(&n))
                .filter(|n| !n.is_empty()),
            full_name,
            gender: provision_request.gender,
            parent_phone: provision_request
                .parent_phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            device_student_id,
        },
        device_ids: device_ids.clone(),
        request_id: provision_request.request_id,
    };

    let outcome = match storage.start_provisioning(data).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(internal_error(e)),
    };

    // 8. 下发日志
    if let Err(e) = storage
        .insert_provisioning_log(ProvisioningLogData {
            school_id,
            student_id: Some(outcome.student.id),
            provisioning_id: Some(outcome.provisioning.id),
            device_id: None,
            level: "info".to_string(),
            stage: "provision_start".to_string(),
            status: "processing".to_string(),
            message: format!(
                "provisioning started for {} to {} device(s)",
                outcome.student.full_name,
                device_ids.len()
            ),
            payload: Some(serde_json::json!({ "device_ids": device_ids })),
        })
        .await
    {
        error!("Failed to write provisioning log: {}", e);
    }

    info!(
        "Provisioning {} started for student {} in school {}",
        outcome.provisioning.id, outcome.student.id, school_id
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(
        ProvisionStudentResponse {
            student: outcome.student,
            provisioning_id: outcome.provisioning.id,
            device_count: outcome.link_count,
            idempotent: false,
        },
        "Provisioning started",
    )))
}

/// 生成未被占用的设备学号
async fn generate_device_student_id(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    school_id: i64,
    length: usize,
) -> Result<String, HttpResponse> {
    for _ in 0..ID_GENERATION_ATTEMPTS {
        let candidate = numeric_code(length);
        match storage
            .get_student_by_device_id(school_id, &candidate)
            .await
        {
            Ok(None) => return Ok(candidate),
            Ok(Some(_)) => continue,
            Err(e) => return Err(internal_error(e)),
        }
    }
    error!(
        "Failed to allocate a device student id for school {} after {} attempts",
        school_id, ID_GENERATION_ATTEMPTS
    );
    Err(
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Failed to allocate a device student id",
        )),
    )
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Provisioning failed: {e}"),
    ))
}
