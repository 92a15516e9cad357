//! 下发审计日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "provisioning_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: Option<i64>,
    pub provisioning_id: Option<i64>,
    pub device_id: Option<i64>,
    pub level: String,
    pub stage: String,
    pub status: String,
    pub message: String,
    pub payload: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    School,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_log(self) -> crate::models::provisioning::entities::ProvisioningLog {
        use crate::models::provisioning::entities::ProvisioningLog;
        use chrono::{DateTime, Utc};

        ProvisioningLog {
            id: self.id,
            school_id: self.school_id,
            student_id: self.student_id,
            provisioning_id: self.provisioning_id,
            device_id: self.device_id,
            level: self.level,
            stage: self.stage,
            status: self.status,
            message: self.message,
            payload: self.payload,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
