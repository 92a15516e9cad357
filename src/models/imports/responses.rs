use super::entities::{ImportJob, ImportMetrics};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 导入提交涉及的学生摘要
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportedStudentRef {
    pub id: i64,
    pub device_student_id: String,
    pub full_name: String,
}

// 设备导入提交结果（幂等缓存的就是这个结构）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct DeviceImportCommitResponse {
    pub job_id: String,
    pub idempotent: bool,
    pub created_count: i64,
    pub updated_count: i64,
    pub created: Vec<ImportedStudentRef>,
    pub updated: Vec<ImportedStudentRef>,
}

// 锁冲突响应体
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportLockConflictResponse {
    pub conflicts: Vec<String>,
}

// 行校验失败响应体
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportValidationResponse {
    pub invalid_count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportJobResponse {
    pub job: ImportJob,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportMetricsResponse {
    pub metrics: ImportMetrics,
}
