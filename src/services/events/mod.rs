pub mod broadcaster;
pub mod stream;

pub use broadcaster::{AttendanceEventMessage, EventBroadcaster};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct EventService {
    storage: Option<Arc<dyn Storage>>,
}

impl EventService {
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

    // 学校事件流
    pub async fn school_stream(
        &self,
        school_id: i64,
        query: stream::SseTokenQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        stream::handle_school_stream(self, school_id, query, request).await
    }

    // 跨校事件流（超级管理员）
    pub async fn admin_stream(
        &self,
        query: stream::SseTokenQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        stream::handle_admin_stream(self, query, request).await
    }
}
