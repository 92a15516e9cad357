use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学生性别
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub enum Gender {
    Male,
    Female,
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // 导入数据里的性别写法五花八门，统一走宽松归一化
        crate::utils::name::normalize_gender(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("无效的性别: '{s}'. 支持: male, female"))
        })
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {s}")),
        }
    }
}

// 设备下发状态（镜像自聚合的 provisioning 状态）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub enum DeviceSyncStatus {
    NotProvisioned,
    Processing,
    Partial,
    Confirmed,
    Failed,
}

impl<'de> Deserialize<'de> for DeviceSyncStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("无效的设备同步状态: '{s}'")))
    }
}

impl std::fmt::Display for DeviceSyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceSyncStatus::NotProvisioned => write!(f, "not_provisioned"),
            DeviceSyncStatus::Processing => write!(f, "processing"),
            DeviceSyncStatus::Partial => write!(f, "partial"),
            DeviceSyncStatus::Confirmed => write!(f, "confirmed"),
            DeviceSyncStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DeviceSyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_provisioned" => Ok(DeviceSyncStatus::NotProvisioned),
            "processing" => Ok(DeviceSyncStatus::Processing),
            "partial" => Ok(DeviceSyncStatus::Partial),
            "confirmed" => Ok(DeviceSyncStatus::Confirmed),
            "failed" => Ok(DeviceSyncStatus::Failed),
            _ => Err(format!("Invalid device sync status: {s}")),
        }
    }
}

// 学生实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    pub id: i64,
    pub school_id: i64,
    pub class_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub full_name: String,
    pub gender: Gender,
    pub parent_phone: Option<String>,
    /// 生物识别设备上的工号，同一学校内唯一
    pub device_student_id: String,
    pub is_active: bool,
    pub device_sync_status: DeviceSyncStatus,
    pub device_sync_updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
