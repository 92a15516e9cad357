use super::entities::{DeviceLink, Provisioning, ProvisioningLog};
use crate::models::students::entities::Student;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct ProvisioningDetailResponse {
    pub provisioning: Provisioning,
    pub student: Student,
    pub links: Vec<DeviceLink>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct DeviceResultResponse {
    pub provisioning: Provisioning,
    pub link: DeviceLink,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct RetryResponse {
    pub provisioning: Provisioning,
    /// 被重置为 pending 的链路数
    pub reset_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct ProvisioningLogsResponse {
    pub items: Vec<ProvisioningLog>,
}
