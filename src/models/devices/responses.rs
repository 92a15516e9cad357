use super::entities::Device;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/device.ts")]
pub struct DeviceResponse {
    pub device: Device,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/device.ts")]
pub struct DeviceListResponse {
    pub items: Vec<Device>,
    pub pagination: PaginationInfo,
}

// 设备健康状态
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/device.ts")]
pub struct DeviceHealthResponse {
    pub device: Device,
    pub last_event_at: Option<chrono::DateTime<chrono::Utc>>,
    /// 最近 10 分钟内有心跳或事件
    pub online: bool,
}
