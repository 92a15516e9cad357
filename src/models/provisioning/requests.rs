use super::entities::LinkStatus;
use serde::Deserialize;
use ts_rs::TS;

// 下发代理上报的单台设备结果
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct DeviceResultRequest {
    /// 三选一：device_id / device_sn / device_name
    pub device_id: Option<i64>,
    pub device_sn: Option<String>,
    pub device_name: Option<String>,
    /// success / failed
    pub status: LinkStatus,
    pub error: Option<String>,
    /// 设备上实际写入的工号
    pub employee_no_on_device: Option<String>,
    /// device_sn 未注册时自动注册设备
    #[serde(default)]
    pub auto_register: bool,
}

// 重试请求：缺省重试所有 failed 链路
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct RetryRequest {
    pub device_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/provisioning.ts")]
pub struct FinalizeFailureRequest {
    pub reason: Option<String>,
}
