pub mod commit;
pub mod import_runtime;
pub mod jobs;

pub use import_runtime::ImportRuntime;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::imports::requests::DeviceImportCommitRequest;
use crate::storage::Storage;

pub struct ImportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ImportService {
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

    // 设备名册导入提交
    pub async fn commit_device_import(
        &self,
        school_id: i64,
        commit_request: DeviceImportCommitRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        commit::commit_device_import(self, school_id, commit_request, request).await
    }

    // 导入任务快照
    pub async fn get_import_job(
        &self,
        school_id: i64,
        job_id: String,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        jobs::get_import_job(self, school_id, job_id, request).await
    }

    // 本校导入指标
    pub async fn get_import_metrics(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        jobs::get_import_metrics(self, school_id, request).await
    }
}
