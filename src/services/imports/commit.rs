use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use super::{ImportRuntime, ImportService};
use crate::models::imports::requests::{DeviceImportCommitRequest, DeviceImportRow};
use crate::models::imports::responses::{
    DeviceImportCommitResponse, ImportLockConflictResponse, ImportValidationResponse,
};
use crate::models::students::entities::Gender;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::{BulkUpsertOutcome, ProvisioningLogData, Storage, StudentUpsertData};
use crate::utils::name::{build_full_name, normalize_name_part};

/// 写进下发日志的 before/after 快照上限，防止大批量导入把日志撑爆
const SNAPSHOT_CAP: usize = 200;

pub async fn commit_device_import(
    service: &ImportService,
    school_id: i64,
    commit_request: DeviceImportCommitRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let runtime = ImportRuntime::get();
    let started = std::time::Instant::now();

    // 1. 幂等重放：同键的提交直接返回上次结果
    if let Some(ref key) = commit_request.idempotency_key
        && let Some(mut cached) = runtime.cached_result(school_id, key)
    {
        cached.idempotent = true;
        info!(
            "Device import replayed idempotently for school {} (key {})",
            school_id, key
        );
        return Ok(HttpResponse::Ok().json(ApiResponse::success(cached, "Import already committed")));
    }

    // 2. 行归一化
    let rows = normalize_rows(commit_request.rows);
    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "No rows to import",
        )));
    }

    let employee_nos: Vec<String> = {
        let mut seen = HashSet::new();
        rows.iter()
            .filter(|r| !r.employee_no.is_empty())
            .filter(|r| seen.insert(r.employee_no.clone()))
            .map(|r| r.employee_no.clone())
            .collect()
    };

    let job = runtime.create_job(school_id, rows.len() as i64);

    // 3. 整批抢锁，冲突即 409
    if let Err(conflicts) = runtime.acquire_locks(school_id, &employee_nos, &job.id) {
        runtime.mark_failed(&job.id, "import lock conflict");
        return Ok(HttpResponse::Conflict().json(ApiResponse::error(
            ErrorCode::ImportLockConflict,
            ImportLockConflictResponse { conflicts },
            "Another import is touching the same employee numbers",
        )));
    }

    // 锁必须释放，成功失败都走这一条路
    let response = run_commit(
        &storage,
        runtime,
        school_id,
        &job.id,
        rows,
        &commit_request.idempotency_key,
        commit_request.retry_mode,
        started,
    )
    .await;
    runtime.release_locks(school_id, &employee_nos);

    response
}

#[allow(clippy::too_many_arguments)]
async fn run_commit(
    storage: &Arc<dyn Storage>,
    runtime: &ImportRuntime,
    school_id: i64,
    job_id: &str,
    rows: Vec<DeviceImportRow>,
    idempotency_key: &Option<String>,
    retry_mode: bool,
    started: std::time::Instant,
) -> ActixResult<HttpResponse> {
    // 4. 行校验
    let errors = match validate_rows(storage, school_id, &rows).await {
        Ok(errors) => errors,
        Err(e) => {
            runtime.mark_failed(job_id, &e);
            runtime.record_run(school_id, false, retry_mode, started.elapsed().as_millis() as i64);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::InternalServerError, e)));
        }
    };
    if !errors.is_empty() {
        runtime.mark_failed(job_id, "row validation failed");
        runtime.record_run(school_id, false, retry_mode, started.elapsed().as_millis() as i64);
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ImportFileDataInvalid,
            ImportValidationResponse {
                invalid_count: errors.len(),
                errors,
            },
            "Import rows failed validation",
        )));
    }

    // 5. 单事务批量 upsert
    runtime.mark_processing(job_id);
    let upserts: Vec<StudentUpsertData> = rows.iter().map(to_upsert_data).collect();
    let total = upserts.len() as i64;

    match storage.bulk_upsert_students(school_id, upserts).await {
        Ok(outcome) => {
            runtime.mark_success(job_id, total);
            runtime.record_run(school_id, true, retry_mode, started.elapsed().as_millis() as i64);

            write_import_log(storage, school_id, job_id, &outcome).await;

            let result = DeviceImportCommitResponse {
                job_id: job_id.to_string(),
                idempotent: false,
                created_count: outcome.created.len() as i64,
                updated_count: outcome.updated.len() as i64,
                created: outcome.created,
                updated: outcome.updated,
            };
            if let Some(key) = idempotency_key {
                runtime.cache_result(school_id, key, result.clone());
            }

            info!(
                "Device import committed for school {}: {} created, {} updated",
                school_id, result.created_count, result.updated_count
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Import committed successfully")))
        }
        Err(e) => {
            let msg = format!("Import commit failed: {e}");
            error!("{}", msg);
            runtime.mark_failed(job_id, &msg);
            runtime.record_run(school_id, false, retry_mode, started.elapsed().as_millis() as i64);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)))
        }
    }
}

fn normalize_rows(rows: Vec<DeviceImportRow>) -> Vec<DeviceImportRow> {
    rows.into_iter()
        .map(|mut row| {
            row.employee_no = row.employee_no.trim().to_string();
            row.first_name = normalize_name_part(&row.first_name);
            row.last_name = normalize_name_part(&row.last_name);
            row.father_name = row
                .father_name
                .map(|n| normalize_name_part(&n))
                .filter(|n| !n.is_empty());
            row.parent_phone = row
                .parent_phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty());
            row
        })
        .collect()
}

/// 校验行内容：必填字段、批内重复工号、班级归属
async fn validate_rows(
    storage: &Arc<dyn Storage>,
    school_id: i64,
    rows: &[DeviceImportRow],
) -> Result<Vec<String>, String> {
    let mut errors = Vec::new();
    let mut seen_nos: HashSet<&str> = HashSet::new();

    let class_ids: Vec<i64> = rows
        .iter()
        .map(|r| r.class_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let known_classes: HashSet<i64> = storage
        .filter_class_ids_in_school(school_id, &class_ids)
        .await
        .map_err(|e| format!("Import commit failed: {e}"))?
        .into_iter()
        .collect();

    for (index, row) in rows.iter().enumerate() {
        let line = index + 1;
        if row.employee_no.is_empty() {
            errors.push(format!("row {line}: employee_no is required"));
            continue;
        }
        if !seen_nos.insert(&row.employee_no) {
            errors.push(format!(
                "row {line}: duplicate employee_no {} in batch",
                row.employee_no
            ));
        }
        if row.first_name.is_empty() || row.last_name.is_empty() {
            errors.push(format!("row {line}: first_name and last_name are required"));
        }
        if row.gender.is_none() {
            errors.push(format!("row {line}: gender is required"));
        }
        if !known_classes.contains(&row.class_id) {
            errors.push(format!(
                "row {line}: class {} does not belong to this school",
                row.class_id
            ));
        }
    }

    Ok(errors)
}

fn to_upsert_data(row: &DeviceImportRow) -> StudentUpsertData {
    StudentUpsertData {
        class_id: row.class_id,
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        father_name: row.father_name.clone(),
        full_name: build_full_name(&row.last_name, &row.first_name),
        gender: row.gender.unwrap_or(Gender::Male),
        parent_phone: row.parent_phone.clone(),
        device_student_id: row.employee_no.clone(),
    }
}

/// 导入结果写入下发日志，快照条数有上限
async fn write_import_log(
    storage: &Arc<dyn Storage>,
    school_id: i64,
    job_id: &str,
    outcome: &BulkUpsertOutcome,
) {
    let snapshots: Vec<&serde_json::Value> = outcome.before_after.iter().take(SNAPSHOT_CAP).collect();
    let payload = serde_json::json!({
        "job_id": job_id,
        "created": outcome.created.len(),
        "updated": outcome.updated.len(),
        "before_after": snapshots,
        "snapshot_truncated": outcome.before_after.len() > SNAPSHOT_CAP,
    });

    if let Err(e) = storage
        .insert_provisioning_log(ProvisioningLogData {
            school_id,
            student_id: None,
            provisioning_id: None,
            device_id: None,
            level: "info".to_string(),
            stage: "device_import".to_string(),
            status: "success".to_string(),
            message: format!(
                "device import committed: {} created, {} updated",
                outcome.created.len(),
                outcome.updated.len()
            ),
            payload: Some(payload),
        })
        .await
    {
        error!("Failed to write import log: {}", e);
    }
}
