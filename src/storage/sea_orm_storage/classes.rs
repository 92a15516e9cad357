use super::SeaOrmStorage;
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::errors::{AttendanceError, Result};
use crate::models::classes::{
    entities::Class,
    requests::{CreateClassRequest, UpdateClassRequest},
};
use crate::storage::ScopedListQuery;
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(
        &self,
        school_id: i64,
        req: CreateClassRequest,
    ) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            school_id: Set(school_id),
            name: Set(req.name),
            grade_level: Set(req.grade_level),
            start_time: Set(req.start_time),
            end_time: Set(req.end_time),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 按名称查找同校班级（同校班名唯一）
    pub async fn get_class_by_name_impl(
        &self,
        school_id: i64,
        name: &str,
    ) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Class>, i64)> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(20).clamp(1, 200) as u64;

        let mut select = Classes::find().filter(Column::SchoolId.eq(school_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级总数失败: {e}")))?;

        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok((
            classes.into_iter().map(|m| m.into_class()).collect(),
            total as i64,
        ))
    }

    /// 列出学校全部班级（考勤名单、看板用）
    pub async fn list_school_classes_impl(&self, school_id: i64) -> Result<Vec<Class>> {
        let classes = Classes::find()
            .filter(Column::SchoolId.eq(school_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }

    /// 过滤出确属该学校的班级 ID 集合
    pub async fn filter_class_ids_in_school_impl(
        &self,
        school_id: i64,
        class_ids: &[i64],
    ) -> Result<Vec<i64>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = Classes::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Id.is_in(class_ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("校验班级失败: {e}")))?;

        Ok(ids)
    }

    /// 更新班级
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(grade_level) = update.grade_level {
            model.grade_level = Set(Some(grade_level));
        }

        if let Some(start_time) = update.start_time {
            model.start_time = Set(start_time);
        }

        if let Some(end_time) = update.end_time {
            model.end_time = Set(Some(end_time));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新班级失败: {e}")))?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
