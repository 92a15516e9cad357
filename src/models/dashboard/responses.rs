use crate::models::attendance::status::NoScanSplit;
use serde::Serialize;
use ts_rs::TS;

// 学校今日看板
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardResponse {
    pub date: String,
    pub total_students: i64,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub excused: i64,
    pub currently_in_school: i64,
    /// round((present + late) / total * 100)
    pub attendance_percent: i64,
    pub no_scan: NoScanSplit,
    /// 当前 SSE 连接数
    pub live_connections: i64,
}
