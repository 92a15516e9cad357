//! 学生实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub class_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub full_name: String,
    pub gender: String,
    pub parent_phone: Option<String>,
    /// 设备工号，(school_id, device_student_id) 唯一
    pub device_student_id: String,
    pub is_active: bool,
    pub device_sync_status: String,
    pub device_sync_updated_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    School,
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::daily_attendance::Entity")]
    DailyAttendance,
    #[sea_orm(has_many = "super::student_provisionings::Entity")]
    Provisionings,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::daily_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyAttendance.def()
    }
}

impl Related<super::student_provisionings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provisionings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_student(self) -> crate::models::students::entities::Student {
        use crate::models::students::entities::{DeviceSyncStatus, Gender, Student};
        use chrono::{DateTime, Utc};

        Student {
            id: self.id,
            school_id: self.school_id,
            class_id: self.class_id,
            first_name: self.first_name,
            last_name: self.last_name,
            father_name: self.father_name,
            full_name: self.full_name,
            gender: self.gender.parse::<Gender>().unwrap_or(Gender::Male),
            parent_phone: self.parent_phone,
            device_student_id: self.device_student_id,
            is_active: self.is_active,
            device_sync_status: self
                .device_sync_status
                .parse::<DeviceSyncStatus>()
                .unwrap_or(DeviceSyncStatus::NotProvisioned),
            device_sync_updated_at: self
                .device_sync_updated_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
