use super::SeaOrmStorage;
use crate::entity::attendance_events;
use crate::entity::devices::{ActiveModel, Column, Entity as Devices};
use crate::errors::{AttendanceError, Result};
use crate::models::devices::{
    entities::Device,
    requests::{CreateDeviceRequest, UpdateDeviceRequest},
};
use crate::storage::ScopedListQuery;
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建设备
    pub async fn create_device_impl(
        &self,
        school_id: i64,
        req: CreateDeviceRequest,
    ) -> Result<Device> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            school_id: Set(school_id),
            device_sn: Set(req.device_sn),
            name: Set(req.name),
            location: Set(req.location),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("创建设备失败: {e}")))?;

        Ok(result.into_device())
    }

    /// 通过 ID 获取设备
    pub async fn get_device_by_id_impl(&self, id: i64) -> Result<Option<Device>> {
        let result = Devices::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备失败: {e}")))?;

        Ok(result.map(|m| m.into_device()))
    }

    /// 通过序列号获取设备（序列号全局唯一，webhook 匹配路径）
    pub async fn get_device_by_sn_impl(&self, device_sn: &str) -> Result<Option<Device>> {
        let result = Devices::find()
            .filter(Column::DeviceSn.eq(device_sn))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备失败: {e}")))?;

        Ok(result.map(|m| m.into_device()))
    }

    /// 按名称精确查找（设备结果上报兼容 device_name 字段）
    pub async fn find_devices_by_name_impl(
        &self,
        school_id: i64,
        name: &str,
    ) -> Result<Vec<Device>> {
        let devices = Devices::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Name.eq(name))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备失败: {e}")))?;

        Ok(devices.into_iter().map(|m| m.into_device()).collect())
    }

    /// 分页列出设备
    pub async fn list_devices_with_pagination_impl(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Device>, i64)> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(20).clamp(1, 200) as u64;

        let mut select = Devices::find().filter(Column::SchoolId.eq(school_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                sea_orm::Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::DeviceSn.contains(&escaped)),
            );
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备总数失败: {e}")))?;

        let devices = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备列表失败: {e}")))?;

        Ok((
            devices.into_iter().map(|m| m.into_device()).collect(),
            total as i64,
        ))
    }

    /// 列出学校启用的设备（下发缺省目标集）
    pub async fn list_active_devices_impl(&self, school_id: i64) -> Result<Vec<Device>> {
        let devices = Devices::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备列表失败: {e}")))?;

        Ok(devices.into_iter().map(|m| m.into_device()).collect())
    }

    /// 过滤出确属该学校的设备 ID 集合
    pub async fn filter_device_ids_in_school_impl(
        &self,
        school_id: i64,
        device_ids: &[i64],
    ) -> Result<Vec<i64>> {
        if device_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = Devices::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Id.is_in(device_ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("校验设备失败: {e}")))?;

        Ok(ids)
    }

    /// 更新设备
    pub async fn update_device_impl(
        &self,
        id: i64,
        update: UpdateDeviceRequest,
    ) -> Result<Option<Device>> {
        let existing = self.get_device_by_id_impl(id).await?;
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

        if let Some(location) = update.location {
            model.location = Set(Some(location));
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新设备失败: {e}")))?;

        self.get_device_by_id_impl(id).await
    }

    /// 删除设备
    pub async fn delete_device_impl(&self, id: i64) -> Result<bool> {
        let result = Devices::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除设备失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 记录设备最近上报时间
    pub async fn touch_device_last_seen_impl(
        &self,
        id: i64,
        seen_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        Devices::update_many()
            .col_expr(
                Column::LastSeen,
                sea_orm::sea_query::Expr::value(seen_at.timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                AttendanceError::database_operation(format!("更新设备上报时间失败: {e}"))
            })?;

        Ok(())
    }

    /// 设备最近一条事件的时间（健康检查）
    pub async fn get_last_event_time_for_device_impl(
        &self,
        device_id: i64,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
        let ts: Option<i64> = attendance_events::Entity::find()
            .select_only()
            .column(attendance_events::Column::Timestamp)
            .filter(attendance_events::Column::DeviceId.eq(device_id))
            .order_by_desc(attendance_events::Column::Timestamp)
            .limit(1)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询设备事件失败: {e}")))?;

        Ok(ts.map(|t| chrono::DateTime::<chrono::Utc>::from_timestamp(t, 0).unwrap_or_default()))
    }
}
