use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学校实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/school.ts")]
pub struct School {
    pub id: i64,
    pub name: String,
    /// IANA 时区名，如 "Asia/Tashkent"
    pub timezone: String,
    /// 班级开始后多少分钟内算迟到
    pub late_threshold_minutes: i64,
    /// 班级开始后多少分钟算缺勤
    pub absence_cutoff_minutes: i64,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub webhook_secret: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
