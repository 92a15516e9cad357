use super::entities::DailyAttendance;
use super::status::EffectiveStatus;
use serde::Serialize;
use ts_rs::TS;

// webhook 处理结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct WebhookEventResponse {
    pub accepted: bool,
    /// duplicate_event / duplicate_scan / unmatched_student 等
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// 今日考勤行
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct TodayAttendanceRow {
    pub student_id: i64,
    pub full_name: String,
    pub class_id: i64,
    pub class_name: String,
    pub device_student_id: String,
    pub status: EffectiveStatus,
    pub late_minutes: i64,
    pub first_scan_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_scan_time: Option<chrono::DateTime<chrono::Utc>>,
    pub currently_in_school: bool,
    pub total_time_on_premises: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct TodayAttendanceResponse {
    pub date: String,
    pub items: Vec<TodayAttendanceRow>,
}

// 报表：单日状态计数
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct ReportDayRow {
    pub date: String,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub excused: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceReportResponse {
    pub from: String,
    pub to: String,
    pub days: Vec<ReportDayRow>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct DailyAttendanceResponse {
    pub record: DailyAttendance,
}
