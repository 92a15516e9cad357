pub mod delete;
pub mod export;
pub mod get;
pub mod import;
pub mod list;
pub mod provision;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::students::requests::{
    ProvisionStudentRequest, StudentExportParams, StudentListParams, TemplateParams,
    UpdateStudentRequest,
};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    // 学生名册
    pub async fn list_students(
        &self,
        school_id: i64,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, school_id, query, request).await
    }

    // 学生详情
    pub async fn get_student(
        &self,
        school_id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, school_id, student_id, request).await
    }

    // 更新学生
    pub async fn update_student(
        &self,
        school_id: i64,
        student_id: i64,
        update_data: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, school_id, student_id, update_data, request).await
    }

    // 停用学生（软删除）
    pub async fn delete_student(
        &self,
        school_id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, school_id, student_id, request).await
    }

    // 名册导出
    pub async fn export_students(
        &self,
        school_id: i64,
        params: StudentExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_students(self, school_id, params, request).await
    }

    // 导入模板下载
    pub async fn download_template(&self, params: TemplateParams) -> ActixResult<HttpResponse> {
        export::download_template(&params.format).await
    }

    // 名册文件导入
    pub async fn import_students(
        &self,
        school_id: i64,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_students(self, school_id, payload, request).await
    }

    // 下发开通
    pub async fn provision_student(
        &self,
        school_id: i64,
        provision_request: ProvisionStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        provision::provision_student(self, school_id, provision_request, request).await
    }
}
