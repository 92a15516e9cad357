use super::SeaOrmStorage;
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{AttendanceError, Result};
use crate::models::{
    PaginationInfo,
    imports::responses::ImportedStudentRef,
    students::{
        entities::Student,
        requests::{StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
};
use crate::storage::{BulkUpsertOutcome, StudentUpsertData};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 通过 ID 获取学生
    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 通过设备工号获取学生（webhook 匹配路径）
    pub async fn get_student_by_device_id_impl(
        &self,
        school_id: i64,
        device_student_id: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::DeviceStudentId.eq(device_student_id))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 分页列出学生
    pub async fn list_students_with_pagination_impl(
        &self,
        school_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(20).clamp(1, 200) as u64;

        let mut select = Students::find().filter(Column::SchoolId.eq(school_id));

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        // 按姓名或设备工号模糊查询
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::FullName.contains(&escaped))
                    .add(Column::DeviceStudentId.contains(&escaped)),
            );
        }

        select = select.order_by_asc(Column::FullName);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生页数失败: {e}")))?;

        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(StudentListResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新学生（full_name 由服务层按姓名变更重算后传入）
    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
        full_name: Option<String>,
    ) -> Result<Option<Student>> {
        let existing = self.get_student_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }

        if let Some(father_name) = update.father_name {
            model.father_name = Set(Some(father_name));
        }

        if let Some(gender) = update.gender {
            model.gender = Set(gender.to_string());
        }

        if let Some(class_id) = update.class_id {
            model.class_id = Set(class_id);
        }

        if let Some(parent_phone) = update.parent_phone {
            model.parent_phone = Set(Some(parent_phone));
        }

        if let Some(device_student_id) = update.device_student_id {
            model.device_student_id = Set(device_student_id);
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        if let Some(full_name) = full_name {
            model.full_name = Set(full_name);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新学生失败: {e}")))?;

        self.get_student_by_id_impl(id).await
    }

    /// 软删除：仅置 is_active = false，保留考勤历史
    pub async fn deactivate_student_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Students::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("停用学生失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 同班同名在册学生查找（重名保护）
    pub async fn find_duplicate_name_in_class_impl(
        &self,
        school_id: i64,
        class_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::FirstName.eq(first_name))
            .filter(Column::LastName.eq(last_name))
            .filter(Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询同名学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 按设备工号批量查找（导入批次预取）
    pub async fn find_students_by_device_ids_impl(
        &self,
        school_id: i64,
        device_student_ids: &[String],
    ) -> Result<Vec<Student>> {
        if device_student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let students = Students::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::DeviceStudentId.is_in(device_student_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    /// 单事务批量 upsert（设备导入提交），以 (school_id, device_student_id) 为键
    pub async fn bulk_upsert_students_impl(
        &self,
        school_id: i64,
        rows: Vec<StudentUpsertData>,
    ) -> Result<BulkUpsertOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let mut created = Vec::new();
        let mut updated = Vec::new();
        let mut before_after = Vec::new();

        for row in rows {
            let existing = Students::find()
                .filter(Column::SchoolId.eq(school_id))
                .filter(Column::DeviceStudentId.eq(row.device_student_id.as_str()))
                .one(&txn)
                .await
                .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

            match existing {
                Some(model) => {
                    let before = serde_json::json!({
                        "full_name": model.full_name,
                        "class_id": model.class_id,
                        "parent_phone": model.parent_phone,
                        "gender": model.gender,
                        "is_active": model.is_active,
                    });

                    let id = model.id;
                    let mut active: ActiveModel = model.into();
                    active.class_id = Set(row.class_id);
                    active.first_name = Set(row.first_name);
                    active.last_name = Set(row.last_name);
                    active.father_name = Set(row.father_name);
                    active.full_name = Set(row.full_name.clone());
                    active.gender = Set(row.gender.to_string());
                    active.parent_phone = Set(row.parent_phone);
                    active.is_active = Set(true);
                    active.updated_at = Set(now);

                    let saved = active.update(&txn).await.map_err(|e| {
                        AttendanceError::database_operation(format!("更新学生失败: {e}"))
                    })?;

                    before_after.push(serde_json::json!({
                        "device_student_id": row.device_student_id,
                        "before": before,
                        "after": {
                            "full_name": saved.full_name,
                            "class_id": saved.class_id,
                            "parent_phone": saved.parent_phone,
                            "gender": saved.gender,
                            "is_active": saved.is_active,
                        },
                    }));

                    updated.push(ImportedStudentRef {
                        id,
                        device_student_id: row.device_student_id,
                        full_name: row.full_name,
                    });
                }
                None => {
                    let model = ActiveModel {
                        school_id: Set(school_id),
                        class_id: Set(row.class_id),
                        first_name: Set(row.first_name),
                        last_name: Set(row.last_name),
                        father_name: Set(row.father_name),
                        full_name: Set(row.full_name.clone()),
                        gender: Set(row.gender.to_string()),
                        parent_phone: Set(row.parent_phone),
                        device_student_id: Set(row.device_student_id.clone()),
                        is_active: Set(true),
                        device_sync_status: Set("not_provisioned".to_string()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };

                    let saved = model.insert(&txn).await.map_err(|e| {
                        AttendanceError::database_operation(format!("创建学生失败: {e}"))
                    })?;

                    before_after.push(serde_json::json!({
                        "device_student_id": row.device_student_id,
                        "before": serde_json::Value::Null,
                        "after": {
                            "full_name": saved.full_name,
                            "class_id": saved.class_id,
                            "parent_phone": saved.parent_phone,
                            "gender": saved.gender,
                            "is_active": saved.is_active,
                        },
                    }));

                    created.push(ImportedStudentRef {
                        id: saved.id,
                        device_student_id: row.device_student_id,
                        full_name: row.full_name,
                    });
                }
            }
        }

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(BulkUpsertOutcome {
            created,
            updated,
            before_after,
        })
    }
}
