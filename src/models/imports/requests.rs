use crate::models::students::entities::Gender;
use serde::Deserialize;
use ts_rs::TS;

// 设备侧导入提交的单行数据
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct DeviceImportRow {
    /// 设备上的工号
    pub employee_no: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub class_id: i64,
    pub parent_phone: Option<String>,
    pub gender: Option<Gender>,
}

// 设备导入提交请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct DeviceImportCommitRequest {
    pub rows: Vec<DeviceImportRow>,
    /// 幂等键：同键重放直接返回缓存结果
    pub idempotency_key: Option<String>,
    /// 重试批次，计入重试率
    #[serde(default)]
    pub retry_mode: bool,
}
