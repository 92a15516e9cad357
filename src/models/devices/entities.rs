use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 考勤设备实体（闸机/人脸终端）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/device.ts")]
pub struct Device {
    pub id: i64,
    pub school_id: i64,
    /// 设备序列号，全局唯一
    pub device_sn: String,
    pub name: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub last_seen: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
