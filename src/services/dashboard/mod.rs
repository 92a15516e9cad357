//! 学校今日看板
//!
//! 把当日名单压成计数：出勤/迟到/缺勤/请假、在校人数、出勤率，
//! 以及按班级课表拆分的未打卡人数。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::attendance::{
    entities::AttendanceStatus,
    status::{attendance_percent, split_no_scan_counts, ClassSchedule},
};
use crate::models::dashboard::responses::DashboardResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::events::EventBroadcaster;
use crate::storage::Storage;
use crate::utils::date::{date_only_in_zone, minutes_in_zone, parse_timezone};

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
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

    pub async fn school_dashboard(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        let school = match storage.get_school_by_id(school_id).await {
            Ok(Some(school)) => school,
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::SchoolNotFound,
                    "School not found",
                )));
            }
            Err(e) => return Ok(internal_error(e)),
        };

        let tz = match parse_timezone(&school.timezone) {
            Ok(tz) => tz,
            Err(e) => return Ok(internal_error(e)),
        };
        let now = Utc::now();
        let date = date_only_in_zone(now, tz);
        let now_minutes = minutes_in_zone(now, tz);

        let rows = match storage.list_today_attendance(school_id, &date, None).await {
            Ok(rows) => rows,
            Err(e) => return Ok(internal_error(e)),
        };

        let total_students = rows.len() as i64;
        let (mut present, mut late, mut absent, mut excused) = (0i64, 0i64, 0i64, 0i64);
        let mut currently_in_school = 0i64;
        // 未打卡拆分的班级口径
        let mut schedules: HashMap<i64, ClassSchedule> = HashMap::new();
        let mut class_totals: HashMap<i64, i64> = HashMap::new();
        let mut class_attended: HashMap<i64, i64> = HashMap::new();

        for row in &rows {
            schedules
                .entry(row.class.id)
                .or_insert_with(|| ClassSchedule {
                    class_id: row.class.id,
                    start_time: Some(row.class.start_time.clone()),
                    end_time: row.class.end_time.clone(),
                });
            *class_totals.entry(row.class.id).or_insert(0) += 1;

            let Some(ref daily) = row.daily else {
                continue;
            };
            *class_attended.entry(row.class.id).or_insert(0) += 1;
            if daily.currently_in_school {
                currently_in_school += 1;
            }
            match daily.status {
                AttendanceStatus::Present => present += 1,
                AttendanceStatus::Late => late += 1,
                AttendanceStatus::Absent => absent += 1,
                AttendanceStatus::Excused => excused += 1,
            }
        }

        let schedules: Vec<ClassSchedule> = schedules.into_values().collect();
        let no_scan = split_no_scan_counts(
            &schedules,
            &class_totals,
            &class_attended,
            school.absence_cutoff_minutes,
            now_minutes,
        );

        let response = DashboardResponse {
            date,
            total_students,
            present,
            late,
            absent,
            excused,
            currently_in_school,
            attendance_percent: attendance_percent(present, late, total_students),
            no_scan,
            live_connections: EventBroadcaster::get().live_connections(school_id) as i64,
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Dashboard retrieved successfully",
        )))
    }
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to build dashboard: {e}"),
    ))
}
