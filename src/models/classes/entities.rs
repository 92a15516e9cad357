use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct Class {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub grade_level: Option<String>,
    /// "HH:MM"，学校时区
    pub start_time: String,
    pub end_time: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
