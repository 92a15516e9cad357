pub mod create;
pub mod delete;
pub mod get;
pub mod health;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::devices::requests::{CreateDeviceRequest, DeviceListParams, UpdateDeviceRequest};
use crate::storage::Storage;

pub struct DeviceService {
    storage: Option<Arc<dyn Storage>>,
}

impl DeviceService {
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

    // 设备列表
    pub async fn list_devices(
        &self,
        school_id: i64,
        query: DeviceListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_devices(self, school_id, query, request).await
    }

    // 注册设备
    pub async fn create_device(
        &self,
        school_id: i64,
        device_data: CreateDeviceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_device(self, school_id, device_data, request).await
    }

    // 设备详情
    pub async fn get_device(
        &self,
        school_id: i64,
        device_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_device(self, school_id, device_id, request).await
    }

    // 设备健康状态（last_seen + 最近事件）
    pub async fn get_device_health(
        &self,
        school_id: i64,
        device_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        health::get_device_health(self, school_id, device_id, request).await
    }

    // 更新设备
    pub async fn update_device(
        &self,
        school_id: i64,
        device_id: i64,
        update_data: UpdateDeviceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_device(self, school_id, device_id, update_data, request).await
    }

    // 删除设备
    pub async fn delete_device(
        &self,
        school_id: i64,
        device_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_device(self, school_id, device_id, request).await
    }
}
