use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 考勤结论（落库状态）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考勤状态: '{s}'. 支持: present, late, absent, excused"
            ))
        })
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Late => write!(f, "late"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Excused => write!(f, "excused"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            "excused" => Ok(AttendanceStatus::Excused),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

// 进出方向
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum EventType {
    In,
    Out,
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("无效的进出方向: '{s}'. 支持: in, out")))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::In => write!(f, "in"),
            EventType::Out => write!(f, "out"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(EventType::In),
            "out" => Ok(EventType::Out),
            _ => Err(format!("Invalid event type: {s}")),
        }
    }
}

// 原始刷卡/刷脸事件
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceEvent {
    pub id: i64,
    /// 幂等键，重复上报直接丢弃
    pub event_key: String,
    pub school_id: i64,
    /// 未匹配到学生的扫描也会保留
    pub student_id: Option<i64>,
    pub device_id: Option<i64>,
    pub event_type: EventType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// 设备上报的原始 JSON
    #[ts(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
}

// 按天汇总的考勤记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct DailyAttendance {
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    /// "YYYY-MM-DD"，学校时区
    pub date: String,
    pub status: AttendanceStatus,
    pub late_minutes: i64,
    pub first_scan_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_scan_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_in_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_out_time: Option<chrono::DateTime<chrono::Utc>>,
    pub currently_in_school: bool,
    pub scan_count: i64,
    /// 在校累计时长（分钟）
    pub total_time_on_premises: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
