//! 学生下发流程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_provisionings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub status: String,
    /// 幂等重放键，(school_id, request_id) 唯一
    pub request_id: Option<String>,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::student_device_links::Entity")]
    Links,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::student_device_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_provisioning(self) -> crate::models::provisioning::entities::Provisioning {
        use crate::models::provisioning::entities::{Provisioning, ProvisioningStatus};
        use chrono::{DateTime, Utc};

        Provisioning {
            id: self.id,
            school_id: self.school_id,
            student_id: self.student_id,
            status: self
                .status
                .parse::<ProvisioningStatus>()
                .unwrap_or(ProvisioningStatus::Processing),
            request_id: self.request_id,
            last_error: self.last_error,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
