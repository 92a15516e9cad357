use super::entities::Student;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentResponse {
    pub student: Student,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListResponse {
    pub items: Vec<Student>,
    pub pagination: PaginationInfo,
}

// 下发开通响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ProvisionStudentResponse {
    pub student: Student,
    pub provisioning_id: i64,
    pub device_count: i64,
    /// request_id 命中已有结果时为 true
    pub idempotent: bool,
}

// 名册导入：单行错误
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ImportRowError {
    /// 1-based，含表头偏移
    pub row: usize,
    pub message: String,
}

// 名册导入结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentImportResponse {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
}
