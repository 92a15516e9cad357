use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 下发流程聚合状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub enum ProvisioningStatus {
    Processing,
    Partial,
    Confirmed,
    Failed,
}

impl<'de> Deserialize<'de> for ProvisioningStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("无效的下发状态: '{s}'")))
    }
}

impl std::fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisioningStatus::Processing => write!(f, "processing"),
            ProvisioningStatus::Partial => write!(f, "partial"),
            ProvisioningStatus::Confirmed => write!(f, "confirmed"),
            ProvisioningStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ProvisioningStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(ProvisioningStatus::Processing),
            "partial" => Ok(ProvisioningStatus::Partial),
            "confirmed" => Ok(ProvisioningStatus::Confirmed),
            "failed" => Ok(ProvisioningStatus::Failed),
            _ => Err(format!("Invalid provisioning status: {s}")),
        }
    }
}

// 单台设备的下发状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub enum LinkStatus {
    Pending,
    Success,
    Failed,
}

impl<'de> Deserialize<'de> for LinkStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("无效的设备下发状态: '{s}'")))
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Pending => write!(f, "pending"),
            LinkStatus::Success => write!(f, "success"),
            LinkStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LinkStatus::Pending),
            "success" => Ok(LinkStatus::Success),
            "failed" => Ok(LinkStatus::Failed),
            _ => Err(format!("Invalid link status: {s}")),
        }
    }
}

// 下发流程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct Provisioning {
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub status: ProvisioningStatus,
    /// 幂等重放键
    pub request_id: Option<String>,
    pub last_error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生-设备下发链路
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct DeviceLink {
    pub id: i64,
    pub provisioning_id: i64,
    pub student_id: i64,
    pub device_id: i64,
    pub status: LinkStatus,
    pub last_error: Option<String>,
    /// 下发到设备上的工号
    pub employee_no_on_device: Option<String>,
    pub attempt_count: i64,
    pub last_attempt_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 下发审计日志
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct ProvisioningLog {
    pub id: i64,
    pub school_id: i64,
    pub student_id: Option<i64>,
    pub provisioning_id: Option<i64>,
    pub device_id: Option<i64>,
    /// info / error
    pub level: String,
    /// provision_start / device_import / device_result / retry / finalize
    pub stage: String,
    pub status: String,
    pub message: String,
    #[ts(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 聚合状态是链路状态的纯函数：
/// 无链路 -> processing；全部 success -> confirmed；
/// 全部 failed -> failed；有 failed -> partial；否则 processing
pub fn compute_provisioning_status(link_statuses: &[LinkStatus]) -> ProvisioningStatus {
    if link_statuses.is_empty() {
        return ProvisioningStatus::Processing;
    }
    let total = link_statuses.len();
    let success = link_statuses
        .iter()
        .filter(|s| **s == LinkStatus::Success)
        .count();
    let failed = link_statuses
        .iter()
        .filter(|s| **s == LinkStatus::Failed)
        .count();

    if success == total {
        ProvisioningStatus::Confirmed
    } else if failed == total {
        ProvisioningStatus::Failed
    } else if failed > 0 {
        ProvisioningStatus::Partial
    } else {
        ProvisioningStatus::Processing
    }
}

impl ProvisioningStatus {
    /// 镜像到 students.device_sync_status
    pub fn as_sync_status(&self) -> crate::models::students::entities::DeviceSyncStatus {
        use crate::models::students::entities::DeviceSyncStatus;
        match self {
            ProvisioningStatus::Processing => DeviceSyncStatus::Processing,
            ProvisioningStatus::Partial => DeviceSyncStatus::Partial,
            ProvisioningStatus::Confirmed => DeviceSyncStatus::Confirmed,
            ProvisioningStatus::Failed => DeviceSyncStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LinkStatus::*;

    #[test]
    fn empty_links_stay_processing() {
        assert_eq!(
            compute_provisioning_status(&[]),
            ProvisioningStatus::Processing
        );
    }

    #[test]
    fn all_success_confirms() {
        assert_eq!(
            compute_provisioning_status(&[Success, Success]),
            ProvisioningStatus::Confirmed
        );
    }

    #[test]
    fn all_failed_fails() {
        assert_eq!(
            compute_provisioning_status(&[Failed, Failed]),
            ProvisioningStatus::Failed
        );
    }

    #[test]
    fn mixed_failed_is_partial() {
        assert_eq!(
            compute_provisioning_status(&[Success, Failed, Pending]),
            ProvisioningStatus::Partial
        );
    }

    #[test]
    fn pending_only_is_processing() {
        assert_eq!(
            compute_provisioning_status(&[Pending, Pending]),
            ProvisioningStatus::Processing
        );
        assert_eq!(
            compute_provisioning_status(&[Success, Pending]),
            ProvisioningStatus::Processing
        );
    }
}
