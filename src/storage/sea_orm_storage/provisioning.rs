use super::SeaOrmStorage;
use crate::entity::provisioning_logs::{
    ActiveModel as LogActiveModel, Column as LogColumn, Entity as ProvisioningLogs,
};
use crate::entity::student_device_links::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as StudentDeviceLinks,
};
use crate::entity::student_provisionings::{
    ActiveModel as ProvisioningActiveModel, Column as ProvisioningColumn,
    Entity as StudentProvisionings, Model as ProvisioningModel,
};
use crate::entity::students::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as Students,
};
use crate::errors::{AttendanceError, Result};
use crate::models::provisioning::entities::{
    DeviceLink, LinkStatus, Provisioning, ProvisioningLog, ProvisioningStatus,
    compute_provisioning_status,
};
use crate::storage::{DeviceResultData, ProvisionStartData, ProvisionStartOutcome,
    ProvisioningLogData};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 下发开通事务：学生 upsert + 流程行 + 设备链路 + 学生状态镜像
    pub async fn start_provisioning_impl(
        &self,
        data: ProvisionStartData,
    ) -> Result<ProvisionStartOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let row = data.student;

        // 以 (school_id, device_student_id) 为键 upsert 学生
        let existing = Students::find()
            .filter(StudentColumn::SchoolId.eq(data.school_id))
            .filter(StudentColumn::DeviceStudentId.eq(row.device_student_id.as_str()))
            .one(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        let student_model = match existing {
            Some(model) => {
                let mut active: StudentActiveModel = model.into();
                active.class_id = Set(row.class_id);
                active.first_name = Set(row.first_name);
                active.last_name = Set(row.last_name);
                active.father_name = Set(row.father_name);
                active.full_name = Set(row.full_name);
                active.gender = Set(row.gender.to_string());
                active.parent_phone = Set(row.parent_phone);
                active.is_active = Set(true);
                active.device_sync_status = Set(ProvisioningStatus::Processing.to_string());
                active.device_sync_updated_at = Set(Some(now));
                active.updated_at = Set(now);
                active.update(&txn).await.map_err(|e| {
                    AttendanceError::database_operation(format!("更新学生失败: {e}"))
                })?
            }
            None => {
                let model = StudentActiveModel {
                    school_id: Set(data.school_id),
                    class_id: Set(row.class_id),
                    first_name: Set(row.first_name),
                    last_name: Set(row.last_name),
                    father_name: Set(row.father_name),
                    full_name: Set(row.full_name),
                    gender: Set(row.gender.to_string()),
                    parent_phone: Set(row.parent_phone),
                    device_student_id: Set(row.device_student_id.clone()),
                    is_active: Set(true),
                    device_sync_status: Set(ProvisioningStatus::Processing.to_string()),
                    device_sync_updated_at: Set(Some(now)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(&txn).await.map_err(|e| {
                    AttendanceError::database_operation(format!("创建学生失败: {e}"))
                })?
            }
        };

        let provisioning = ProvisioningActiveModel {
            school_id: Set(data.school_id),
            student_id: Set(student_model.id),
            status: Set(ProvisioningStatus::Processing.to_string()),
            request_id: Set(data.request_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AttendanceError::database_operation(format!("创建下发流程失败: {e}")))?;

        let link_count = data.device_ids.len() as i64;
        for device_id in data.device_ids {
            LinkActiveModel {
                provisioning_id: Set(provisioning.id),
                student_id: Set(student_model.id),
                device_id: Set(device_id),
                status: Set(LinkStatus::Pending.to_string()),
                employee_no_on_device: Set(Some(row.device_student_id.clone())),
                attempt_count: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("创建设备链路失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(ProvisionStartOutcome {
            student: student_model.into_student(),
            provisioning: provisioning.into_provisioning(),
            link_count,
        })
    }

    /// request_id 幂等重放查找
    pub async fn find_provisioning_by_request_id_impl(
        &self,
        school_id: i64,
        request_id: &str,
    ) -> Result<Option<Provisioning>> {
        let result = StudentProvisionings::find()
            .filter(ProvisioningColumn::SchoolId.eq(school_id))
            .filter(ProvisioningColumn::RequestId.eq(request_id))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询下发流程失败: {e}")))?;

        Ok(result.map(|m| m.into_provisioning()))
    }

    /// 通过 ID 获取下发流程
    pub async fn get_provisioning_by_id_impl(&self, id: i64) -> Result<Option<Provisioning>> {
        let result = StudentProvisionings::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询下发流程失败: {e}")))?;

        Ok(result.map(|m| m.into_provisioning()))
    }

    /// 下发流程的全部设备链路
    pub async fn get_provisioning_links_impl(
        &self,
        provisioning_id: i64,
    ) -> Result<Vec<DeviceLink>> {
        let links = StudentDeviceLinks::find()
            .filter(LinkColumn::ProvisioningId.eq(provisioning_id))
            .order_by_asc(LinkColumn::DeviceId)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备链路失败: {e}")))?;

        Ok(links.into_iter().map(|m| m.into_link()).collect())
    }

    /// 单台设备结果：链路 upsert + 聚合状态重算 + 学生镜像
    pub async fn apply_device_result_impl(
        &self,
        data: DeviceResultData,
    ) -> Result<(Provisioning, DeviceLink)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();

        let link = StudentDeviceLinks::find()
            .filter(LinkColumn::ProvisioningId.eq(data.provisioning_id))
            .filter(LinkColumn::DeviceId.eq(data.device_id))
            .one(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备链路失败: {e}")))?
            .ok_or_else(|| {
                AttendanceError::not_found(format!(
                    "下发流程 {} 不包含设备 {}",
                    data.provisioning_id, data.device_id
                ))
            })?;

        let prev_attempts = link.attempt_count;
        let mut active: LinkActiveModel = link.into();
        active.status = Set(data.status.to_string());
        active.last_error = Set(data.error);
        active.attempt_count = Set(prev_attempts + 1);
        active.last_attempt_at = Set(Some(now));
        active.updated_at = Set(now);
        if let Some(employee_no) = data.employee_no_on_device {
            active.employee_no_on_device = Set(Some(employee_no));
        }

        let saved_link = active
            .update(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新设备链路失败: {e}")))?;

        let provisioning =
            Self::recompute_provisioning_status(&txn, data.provisioning_id, None).await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((provisioning.into_provisioning(), saved_link.into_link()))
    }

    /// 重试：把指定（缺省为全部 failed）链路重置为 pending
    pub async fn retry_provisioning_links_impl(
        &self,
        provisioning_id: i64,
        device_ids: Option<Vec<i64>>,
    ) -> Result<(Provisioning, i64)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();

        let mut update = StudentDeviceLinks::update_many()
            .col_expr(
                LinkColumn::Status,
                sea_orm::sea_query::Expr::value(LinkStatus::Pending.to_string()),
            )
            .col_expr(
                LinkColumn::LastError,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .col_expr(LinkColumn::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(LinkColumn::ProvisioningId.eq(provisioning_id));

        match device_ids {
            Some(ids) => {
                update = update.filter(LinkColumn::DeviceId.is_in(ids));
            }
            None => {
                update = update.filter(LinkColumn::Status.eq(LinkStatus::Failed.to_string()));
            }
        }

        let result = update
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("重置设备链路失败: {e}")))?;

        let provisioning =
            Self::recompute_provisioning_status(&txn, provisioning_id, None).await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((
            provisioning.into_provisioning(),
            result.rows_affected as i64,
        ))
    }

    /// 收尾：把仍 pending 的链路判失败并重算聚合状态
    pub async fn finalize_provisioning_failure_impl(
        &self,
        provisioning_id: i64,
        reason: &str,
    ) -> Result<Provisioning> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();

        StudentDeviceLinks::update_many()
            .col_expr(
                LinkColumn::Status,
                sea_orm::sea_query::Expr::value(LinkStatus::Failed.to_string()),
            )
            .col_expr(
                LinkColumn::LastError,
                sea_orm::sea_query::Expr::value(Some(reason.to_string())),
            )
            .col_expr(LinkColumn::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(LinkColumn::ProvisioningId.eq(provisioning_id))
            .filter(LinkColumn::Status.eq(LinkStatus::Pending.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("关闭设备链路失败: {e}")))?;

        let provisioning =
            Self::recompute_provisioning_status(&txn, provisioning_id, Some(reason.to_string()))
                .await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(provisioning.into_provisioning())
    }

    /// 聚合状态重算并镜像到学生（事务内调用）
    async fn recompute_provisioning_status(
        txn: &DatabaseTransaction,
        provisioning_id: i64,
        last_error: Option<String>,
    ) -> Result<ProvisioningModel> {
        let provisioning = StudentProvisionings::find_by_id(provisioning_id)
            .one(txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询下发流程失败: {e}")))?
            .ok_or_else(|| {
                AttendanceError::not_found(format!("下发流程不存在: {provisioning_id}"))
            })?;

        let statuses: Vec<String> = StudentDeviceLinks::find()
            .select_only()
            .column(LinkColumn::Status)
            .filter(LinkColumn::ProvisioningId.eq(provisioning_id))
            .into_tuple()
            .all(txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备链路失败: {e}")))?;

        let link_statuses: Vec<LinkStatus> = statuses
            .iter()
            .filter_map(|s| s.parse::<LinkStatus>().ok())
            .collect();
        let status = compute_provisioning_status(&link_statuses);

        let now = chrono::Utc::now().timestamp();
        let student_id = provisioning.student_id;

        let mut active: ProvisioningActiveModel = provisioning.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(now);
        if let Some(error) = last_error {
            active.last_error = Set(Some(error));
        }

        let saved = active
            .update(txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新下发流程失败: {e}")))?;

        // 镜像到学生行，列表页不用再连表
        Students::update_many()
            .col_expr(
                StudentColumn::DeviceSyncStatus,
                sea_orm::sea_query::Expr::value(status.as_sync_status().to_string()),
            )
            .col_expr(
                StudentColumn::DeviceSyncUpdatedAt,
                sea_orm::sea_query::Expr::value(Some(now)),
            )
            .col_expr(
                StudentColumn::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(StudentColumn::Id.eq(student_id))
            .exec(txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新学生状态失败: {e}")))?;

        Ok(saved)
    }

    /// 写入下发审计日志
    pub async fn insert_provisioning_log_impl(&self, data: ProvisioningLogData) -> Result<()> {
        let payload = match data.payload {
            Some(value) => Some(serde_json::to_string(&value)?),
            None => None,
        };

        LogActiveModel {
            school_id: Set(data.school_id),
            student_id: Set(data.student_id),
            provisioning_id: Set(data.provisioning_id),
            device_id: Set(data.device_id),
            level: Set(data.level),
            stage: Set(data.stage),
            status: Set(data.status),
            message: Set(data.message),
            payload: Set(payload),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| AttendanceError::database_operation(format!("写入审计日志失败: {e}")))?;

        Ok(())
    }

    /// 下发流程的审计日志（新到旧）
    pub async fn list_provisioning_logs_impl(
        &self,
        provisioning_id: i64,
        limit: u64,
    ) -> Result<Vec<ProvisioningLog>> {
        let logs = ProvisioningLogs::find()
            .filter(LogColumn::ProvisioningId.eq(provisioning_id))
            .order_by_desc(LogColumn::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询审计日志失败: {e}")))?;

        Ok(logs.into_iter().map(|m| m.into_log()).collect())
    }
}
