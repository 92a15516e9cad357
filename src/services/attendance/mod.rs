//! 考勤
//!
//! webhook 事件入库、今日名单、区间报表、报表导出与手工修正。
//! 状态判定全部走 `models::attendance::status` 里的纯函数。

pub mod export;
pub mod manual;
pub mod report;
pub mod today;
pub mod webhook;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::attendance::requests::{
    ReportQuery, TodayQuery, UpsertAttendanceRequest, WebhookEventRequest,
};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
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

    // 设备 webhook 事件
    pub async fn handle_webhook(
        &self,
        school_id: i64,
        direction: String,
        event: WebhookEventRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        webhook::handle_webhook(self, school_id, direction, event, request).await
    }

    // 今日名单（有效状态）
    pub async fn today_attendance(
        &self,
        school_id: i64,
        query: TodayQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        today::today_attendance(self, school_id, query, request).await
    }

    // 区间报表
    pub async fn attendance_report(
        &self,
        school_id: i64,
        query: ReportQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        report::attendance_report(self, school_id, query, request).await
    }

    // 报表 xlsx 导出
    pub async fn export_report(
        &self,
        school_id: i64,
        query: ReportQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_report(self, school_id, query, request).await
    }

    // 手工修正某学生某天的记录
    pub async fn upsert_attendance(
        &self,
        school_id: i64,
        upsert_request: UpsertAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manual::upsert_attendance(self, school_id, upsert_request, request).await
    }
}
