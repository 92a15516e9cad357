//! 学生-设备下发链路实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_device_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// (provisioning_id, device_id) 唯一
    pub provisioning_id: i64,
    pub student_id: i64,
    pub device_id: i64,
    pub status: String,
    pub last_error: Option<String>,
    pub employee_no_on_device: Option<String>,
    pub attempt_count: i64,
    pub last_attempt_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_provisionings::Entity",
        from = "Column::ProvisioningId",
        to = "super::student_provisionings::Column::Id"
    )]
    Provisioning,
    #[sea_orm(
        belongs_to = "super::devices::Entity",
        from = "Column::DeviceId",
        to = "super::devices::Column::Id"
    )]
    Device,
}

impl Related<super::student_provisionings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provisioning.def()
    }
}

impl Related<super::devices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_link(self) -> crate::models::provisioning::entities::DeviceLink {
        use crate::models::provisioning::entities::{DeviceLink, LinkStatus};
        use chrono::{DateTime, Utc};

        DeviceLink {
            id: self.id,
            provisioning_id: self.provisioning_id,
            student_id: self.student_id,
            device_id: self.device_id,
            status: self.status.parse::<LinkStatus>().unwrap_or(LinkStatus::Pending),
            last_error: self.last_error,
            employee_no_on_device: self.employee_no_on_device,
            attempt_count: self.attempt_count,
            last_attempt_at: self
                .last_attempt_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
