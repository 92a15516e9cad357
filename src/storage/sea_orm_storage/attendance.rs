use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::attendance_events::{
    ActiveModel as EventActiveModel, Column as EventColumn, Entity as AttendanceEvents,
};
use crate::entity::daily_attendance::{
    ActiveModel as DailyActiveModel, Column as DailyColumn, Entity as DailyAttendances,
    Model as DailyModel,
};
use crate::entity::{classes, students};
use crate::errors::{AttendanceError, Result};
use crate::models::attendance::entities::{AttendanceStatus, DailyAttendance, EventType};
use crate::storage::{
    ManualAttendanceData, OrphanEventData, TodayRowData, WebhookApplyData, WebhookOutcome,
};
use crate::utils::date::parse_hhmm;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// webhook 事件事务：
    /// 1. event_key 去重
    /// 2. 同方向最小扫描间隔抑制
    /// 3. 原始事件落库
    /// 4. (student_id, date) 日汇总 upsert
    pub async fn apply_webhook_event_impl(&self, data: WebhookApplyData) -> Result<WebhookOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        // event_key 幂等去重
        let duplicate = AttendanceEvents::find()
            .filter(EventColumn::EventKey.eq(data.event_key.as_str()))
            .one(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询事件失败: {e}")))?;

        if duplicate.is_some() {
            txn.rollback()
                .await
                .map_err(|e| AttendanceError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(WebhookOutcome::DuplicateEvent);
        }

        let existing = DailyAttendances::find()
            .filter(DailyColumn::StudentId.eq(data.student_id))
            .filter(DailyColumn::Date.eq(data.date.as_str()))
            .one(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询日汇总失败: {e}")))?;

        // 同方向短间隔重复刷卡：不入账，也不落原始事件
        if let Some(ref daily) = existing
            && Self::is_duplicate_scan(daily, &data)
        {
            txn.rollback()
                .await
                .map_err(|e| AttendanceError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(WebhookOutcome::DuplicateScan);
        }

        Self::insert_event_row(
            &txn,
            data.school_id,
            Some(data.student_id),
            data.device_id,
            &data.event_key,
            data.event_type,
            data.timestamp.timestamp(),
            data.raw_payload.clone(),
        )
        .await?;

        let now = chrono::Utc::now().timestamp();
        let event_ts = data.timestamp.timestamp();

        let saved = match existing {
            Some(daily) => {
                let first_in = daily.last_in_time.is_none();
                let status = daily
                    .status
                    .parse::<AttendanceStatus>()
                    .unwrap_or(AttendanceStatus::Absent);
                let prev_last_in = daily.last_in_time;
                let prev_in_school = daily.currently_in_school;
                let prev_total = daily.total_time_on_premises;
                let prev_scan_count = daily.scan_count;
                let first_scan = daily.first_scan_time;

                let mut active: DailyActiveModel = daily.into();
                active.last_scan_time = Set(Some(event_ts));
                active.scan_count = Set(prev_scan_count + 1);
                active.updated_at = Set(now);

                if first_scan.is_none() {
                    active.first_scan_time = Set(Some(event_ts));
                }

                match data.event_type {
                    EventType::In => {
                        // 首次入校刷卡才判定状态，手工置 absent 的记录保持不变
                        if first_in && status != AttendanceStatus::Absent {
                            let (s, l) = Self::classify_first_in(&data);
                            active.status = Set(s.to_string());
                            active.late_minutes = Set(l);
                        }
                        active.last_in_time = Set(Some(event_ts));
                        active.currently_in_school = Set(true);
                    }
                    EventType::Out => {
                        active.last_out_time = Set(Some(event_ts));
                        active.currently_in_school = Set(false);

                        if let Some(session_minutes) = Self::out_session_minutes(
                            prev_last_in,
                            prev_in_school,
                            event_ts,
                            data.max_session_minutes,
                        ) {
                            active.total_time_on_premises = Set(prev_total + session_minutes);
                        }
                    }
                }

                active.update(&txn).await.map_err(|e| {
                    AttendanceError::database_operation(format!("更新日汇总失败: {e}"))
                })?
            }
            None => {
                let (status, late_minutes, currently_in, last_in, last_out) = match data.event_type
                {
                    EventType::In => {
                        let (s, l) = Self::classify_first_in(&data);
                        (s, l, true, Some(event_ts), None)
                    }
                    // 先刷出后刷入的乱序场景：人已在校，按 present 建档
                    EventType::Out => (AttendanceStatus::Present, 0, false, None, Some(event_ts)),
                };

                let model = DailyActiveModel {
                    school_id: Set(data.school_id),
                    student_id: Set(data.student_id),
                    date: Set(data.date.clone()),
                    status: Set(status.to_string()),
                    late_minutes: Set(late_minutes),
                    first_scan_time: Set(Some(event_ts)),
                    last_scan_time: Set(Some(event_ts)),
                    last_in_time: Set(last_in),
                    last_out_time: Set(last_out),
                    currently_in_school: Set(currently_in),
                    scan_count: Set(1),
                    total_time_on_premises: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                model.insert(&txn).await.map_err(|e| {
                    AttendanceError::database_operation(format!("创建日汇总失败: {e}"))
                })?
            }
        };

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(WebhookOutcome::Applied {
            status: saved
                .status
                .parse::<AttendanceStatus>()
                .unwrap_or(AttendanceStatus::Absent),
            late_minutes: saved.late_minutes,
            currently_in_school: saved.currently_in_school,
        })
    }

    /// 同方向最小扫描间隔内的重复刷卡判定
    fn is_duplicate_scan(daily: &DailyModel, data: &WebhookApplyData) -> bool {
        let event_ts = data.timestamp.timestamp();
        match data.event_type {
            EventType::In => daily.last_in_time.is_some_and(|last| {
                daily.currently_in_school && event_ts - last < data.min_scan_interval_seconds
            }),
            EventType::Out => daily.last_out_time.is_some_and(|last| {
                !daily.currently_in_school && event_ts - last < data.min_scan_interval_seconds
            }),
        }
    }

    /// 首次入校刷卡的状态判定
    /// 出校刷卡可入账的停留时长。仅在"仍在校"状态下累计，
    /// 重复 OUT 不再入账；超出单次停留上限视为漏刷，整段放弃。
    fn out_session_minutes(
        prev_last_in: Option<i64>,
        prev_in_school: bool,
        event_ts: i64,
        max_session_minutes: i64,
    ) -> Option<i64> {
        let in_ts = prev_last_in?;
        if !prev_in_school {
            return None;
        }

        let session_minutes = (event_ts - in_ts) / 60;
        if session_minutes > 0 && session_minutes < max_session_minutes {
            Some(session_minutes)
        } else {
            None
        }
    }

    fn classify_first_in(data: &WebhookApplyData) -> (AttendanceStatus, i64) {
        let Some(start_minutes) = data.class_start.as_deref().and_then(parse_hhmm) else {
            // 班级未配置上课时间，无从判定迟到
            return (AttendanceStatus::Present, 0);
        };

        let diff = data.event_minutes - start_minutes;
        if diff >= data.absence_cutoff_minutes {
            (AttendanceStatus::Absent, 0)
        } else if diff >= data.late_threshold_minutes {
            (AttendanceStatus::Late, diff - data.late_threshold_minutes)
        } else {
            (AttendanceStatus::Present, 0)
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_event_row(
        txn: &DatabaseTransaction,
        school_id: i64,
        student_id: Option<i64>,
        device_id: Option<i64>,
        event_key: &str,
        event_type: EventType,
        timestamp: i64,
        raw_payload: Option<String>,
    ) -> Result<()> {
        let model = EventActiveModel {
            event_key: Set(event_key.to_string()),
            school_id: Set(school_id),
            student_id: Set(student_id),
            device_id: Set(device_id),
            event_type: Set(event_type.to_string()),
            timestamp: Set(timestamp),
            raw_payload: Set(raw_payload),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .insert(txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("写入事件失败: {e}")))?;

        Ok(())
    }

    /// 未匹配到学生的事件仅存原始记录（返回是否实际写入）
    pub async fn record_orphan_event_impl(&self, data: OrphanEventData) -> Result<bool> {
        let duplicate = AttendanceEvents::find()
            .filter(EventColumn::EventKey.eq(data.event_key.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询事件失败: {e}")))?;

        if duplicate.is_some() {
            return Ok(false);
        }

        let model = EventActiveModel {
            event_key: Set(data.event_key),
            school_id: Set(data.school_id),
            student_id: Set(None),
            device_id: Set(data.device_id),
            event_type: Set(data.event_type.to_string()),
            timestamp: Set(data.timestamp.timestamp()),
            raw_payload: Set(data.raw_payload),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("写入事件失败: {e}")))?;

        Ok(true)
    }

    /// 今日名单：在册学生 × 班级 × 可选日汇总
    pub async fn list_today_attendance_impl(
        &self,
        school_id: i64,
        date: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<TodayRowData>> {
        let mut select = students::Entity::find()
            .filter(students::Column::SchoolId.eq(school_id))
            .filter(students::Column::IsActive.eq(true));

        if let Some(class_id) = class_id {
            select = select.filter(students::Column::ClassId.eq(class_id));
        }

        let student_models = select
            .order_by_asc(students::Column::FullName)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        let class_map: HashMap<i64, classes::Model> = classes::Entity::find()
            .filter(classes::Column::SchoolId.eq(school_id))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let daily_map: HashMap<i64, DailyModel> = DailyAttendances::find()
            .filter(DailyColumn::SchoolId.eq(school_id))
            .filter(DailyColumn::Date.eq(date))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询日汇总失败: {e}")))?
            .into_iter()
            .map(|d| (d.student_id, d))
            .collect();

        let mut rows = Vec::with_capacity(student_models.len());
        for model in student_models {
            let Some(class) = class_map.get(&model.class_id).cloned() else {
                // 班级已删但学生尚在，跳过而不是整表报错
                continue;
            };
            let daily = daily_map.get(&model.id).cloned().map(|d| d.into_daily());
            rows.push(TodayRowData {
                student: model.into_student(),
                class: class.into_class(),
                daily,
            });
        }

        Ok(rows)
    }

    /// 日期区间内的日汇总记录
    pub async fn list_attendance_range_impl(
        &self,
        school_id: i64,
        from: &str,
        to: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<DailyAttendance>> {
        let mut select = DailyAttendances::find()
            .filter(DailyColumn::SchoolId.eq(school_id))
            .filter(DailyColumn::Date.gte(from))
            .filter(DailyColumn::Date.lte(to));

        // 班级过滤走学生子集（日汇总表不冗余 class_id）
        if let Some(class_id) = class_id {
            let student_ids: Vec<i64> = students::Entity::find()
                .select_only()
                .column(students::Column::Id)
                .filter(students::Column::ClassId.eq(class_id))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

            if student_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(DailyColumn::StudentId.is_in(student_ids));
        }

        let records = select
            .order_by_asc(DailyColumn::Date)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询日汇总失败: {e}")))?;

        Ok(records.into_iter().map(|m| m.into_daily()).collect())
    }

    /// 手工修正 (student_id, date) 记录
    pub async fn upsert_manual_attendance_impl(
        &self,
        data: ManualAttendanceData,
    ) -> Result<DailyAttendance> {
        let now = chrono::Utc::now().timestamp();

        let existing = DailyAttendances::find()
            .filter(DailyColumn::StudentId.eq(data.student_id))
            .filter(DailyColumn::Date.eq(data.date.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询日汇总失败: {e}")))?;

        let saved = match existing {
            Some(model) => {
                let mut active: DailyActiveModel = model.into();
                active.status = Set(data.status.to_string());
                active.late_minutes = Set(data.late_minutes);
                active.updated_at = Set(now);
                active.update(&self.db).await.map_err(|e| {
                    AttendanceError::database_operation(format!("更新日汇总失败: {e}"))
                })?
            }
            None => {
                let model = DailyActiveModel {
                    school_id: Set(data.school_id),
                    student_id: Set(data.student_id),
                    date: Set(data.date),
                    status: Set(data.status.to_string()),
                    late_minutes: Set(data.late_minutes),
                    currently_in_school: Set(false),
                    scan_count: Set(0),
                    total_time_on_premises: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(&self.db).await.map_err(|e| {
                    AttendanceError::database_operation(format!("创建日汇总失败: {e}"))
                })?
            }
        };

        Ok(saved.into_daily())
    }
}

#[cfg(test)]
mod tests {
    use super::SeaOrmStorage;

    // 08:00 入校、09:00 出校，入账 60 分钟
    #[test]
    fn out_accumulates_single_session() {
        let in_ts = 8 * 3600;
        let out_ts = 9 * 3600;
        assert_eq!(
            SeaOrmStorage::out_session_minutes(Some(in_ts), true, out_ts, 960),
            Some(60)
        );
    }

    // 09:00 出校后 10:00 再次 OUT：已不在校，同一段停留不能重复入账
    #[test]
    fn repeated_out_does_not_double_count() {
        let in_ts = 8 * 3600;
        let second_out_ts = 10 * 3600;
        assert_eq!(
            SeaOrmStorage::out_session_minutes(Some(in_ts), false, second_out_ts, 960),
            None
        );
    }

    #[test]
    fn out_without_prior_in_is_ignored() {
        assert_eq!(
            SeaOrmStorage::out_session_minutes(None, false, 9 * 3600, 960),
            None
        );
    }

    // 超过单次停留上限（漏刷 OUT 后次日补刷）整段放弃
    #[test]
    fn overlong_session_is_dropped() {
        let in_ts = 8 * 3600;
        let out_ts = in_ts + 961 * 60;
        assert_eq!(
            SeaOrmStorage::out_session_minutes(Some(in_ts), true, out_ts, 960),
            None
        );
    }
}
