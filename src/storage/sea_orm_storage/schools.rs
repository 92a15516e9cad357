use super::SeaOrmStorage;
use crate::entity::schools::{ActiveModel, Column, Entity as Schools};
use crate::errors::{AttendanceError, Result};
use crate::models::schools::{entities::School, requests::UpdateSchoolRequest};
use crate::storage::{CreateSchoolData, SchoolListQuery};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建学校
    pub async fn create_school_impl(&self, data: CreateSchoolData) -> Result<School> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(data.name),
            timezone: Set(data.timezone),
            late_threshold_minutes: Set(data.late_threshold_minutes),
            absence_cutoff_minutes: Set(data.absence_cutoff_minutes),
            webhook_secret: Set(data.webhook_secret),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("创建学校失败: {e}")))?;

        Ok(result.into_school())
    }

    /// 通过 ID 获取学校
    pub async fn get_school_by_id_impl(&self, id: i64) -> Result<Option<School>> {
        let result = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学校失败: {e}")))?;

        Ok(result.map(|m| m.into_school()))
    }

    /// 通过名称获取学校（唯一名校验）
    pub async fn get_school_by_name_impl(&self, name: &str) -> Result<Option<School>> {
        let result = Schools::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学校失败: {e}")))?;

        Ok(result.map(|m| m.into_school()))
    }

    /// 分页列出学校
    pub async fn list_schools_with_pagination_impl(
        &self,
        query: SchoolListQuery,
    ) -> Result<(Vec<School>, i64)> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(20).clamp(1, 200) as u64;

        let mut select = Schools::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学校总数失败: {e}")))?;

        let schools = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学校列表失败: {e}")))?;

        Ok((
            schools.into_iter().map(|m| m.into_school()).collect(),
            total as i64,
        ))
    }

    /// 更新学校（new_secret 有值时轮换 webhook secret）
    pub async fn update_school_impl(
        &self,
        id: i64,
        update: UpdateSchoolRequest,
        new_secret: Option<String>,
    ) -> Result<Option<School>> {
        let existing = self.get_school_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(timezone) = update.timezone {
            model.timezone = Set(timezone);
        }

        if let Some(minutes) = update.late_threshold_minutes {
            model.late_threshold_minutes = Set(minutes);
        }

        if let Some(minutes) = update.absence_cutoff_minutes {
            model.absence_cutoff_minutes = Set(minutes);
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        if let Some(secret) = new_secret {
            model.webhook_secret = Set(secret);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新学校失败: {e}")))?;

        self.get_school_by_id_impl(id).await
    }

    /// 删除学校
    pub async fn delete_school_impl(&self, id: i64) -> Result<bool> {
        let result = Schools::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除学校失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
