pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::schools::requests::{CreateSchoolRequest, SchoolListParams, UpdateSchoolRequest};
use crate::storage::Storage;

pub struct SchoolService {
    storage: Option<Arc<dyn Storage>>,
}

impl SchoolService {
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

    // 学校列表
    pub async fn list_schools(
        &self,
        query: SchoolListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_schools(self, query, request).await
    }

    // 创建学校（可同时种子一个学校管理员）
    pub async fn create_school(
        &self,
        school_data: CreateSchoolRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_school(self, school_data, request).await
    }

    // 学校详情
    pub async fn get_school(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_school(self, school_id, request).await
    }

    // 更新学校（可轮换 webhook secret）
    pub async fn update_school(
        &self,
        school_id: i64,
        update_data: UpdateSchoolRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_school(self, school_id, update_data, request).await
    }

    // 删除学校
    pub async fn delete_school(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_school(self, school_id, request).await
    }
}
