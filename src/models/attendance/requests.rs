use super::entities::AttendanceStatus;
use serde::Deserialize;
use ts_rs::TS;

// 设备 webhook 上报体（宽松字段名，兼容不同固件）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct WebhookEventRequest {
    /// 设备上的学生工号
    #[serde(alias = "employeeNoString", alias = "employee_no")]
    pub employee_no: String,
    /// 设备序列号
    #[serde(alias = "deviceSn", alias = "serialNo")]
    pub device_sn: Option<String>,
    /// 事件时间，缺省取服务器时间
    #[serde(alias = "dateTime", alias = "time")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    /// 设备侧事件 ID，参与幂等键
    #[serde(alias = "eventId", alias = "serialNumber")]
    pub event_id: Option<String>,
}

// 今日考勤查询
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct TodayQuery {
    pub class_id: Option<i64>,
}

// 区间报表查询
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct ReportQuery {
    /// "YYYY-MM-DD"
    pub from: String,
    pub to: String,
    pub class_id: Option<i64>,
}

// 手工修正请求（请假等）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct UpsertAttendanceRequest {
    pub student_id: i64,
    /// "YYYY-MM-DD"，学校时区
    pub date: String,
    pub status: AttendanceStatus,
    pub late_minutes: Option<i64>,
}
