//! 下发流程管理
//!
//! 下发代理回报设备结果、重试、失败收尾与审计日志查询。
//! 流程聚合状态的计算见 `models::provisioning::compute_provisioning_status`。

pub mod detail;
pub mod device_result;
pub mod finalize;
pub mod logs;
pub mod retry;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::provisioning::requests::{
    DeviceResultRequest, FinalizeFailureRequest, RetryRequest,
};
use crate::storage::Storage;

pub struct ProvisioningService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProvisioningService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 流程详情（学生 + 设备链路）
    pub async fn get_provisioning(
        &self,
        provisioning_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_provisioning(self, provisioning_id, request).await
    }

    // 下发代理上报单台设备结果
    pub async fn report_device_result(
        &self,
        provisioning_id: i64,
        result: DeviceResultRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        device_result::report_device_result(self, provisioning_id, result, request).await
    }

    // 重试失败链路
    pub async fn retry_provisioning(
        &self,
        provisioning_id: i64,
        retry_request: RetryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        retry::retry_provisioning(self, provisioning_id, retry_request, request).await
    }

    // 收尾：把仍 pending 的链路判为失败
    pub async fn finalize_failure(
        &self,
        provisioning_id: i64,
        finalize_request: FinalizeFailureRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        finalize::finalize_failure(self, provisioning_id, finalize_request, request).await
    }

    // 审计日志
    pub async fn get_provisioning_logs(
        &self,
        provisioning_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        logs::get_provisioning_logs(self, provisioning_id, request).await
    }
}
