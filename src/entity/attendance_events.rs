//! 原始考勤事件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 幂等键，重复上报直接丢弃
    #[sea_orm(unique)]
    pub event_key: String,
    pub school_id: i64,
    pub student_id: Option<i64>,
    pub device_id: Option<i64>,
    pub event_type: String,
    pub timestamp: i64,
    pub raw_payload: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::devices::Entity",
        from = "Column::DeviceId",
        to = "super::devices::Column::Id"
    )]
    Device,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_event(self) -> crate::models::attendance::entities::AttendanceEvent {
        use crate::models::attendance::entities::{AttendanceEvent, EventType};
        use chrono::{DateTime, Utc};

        AttendanceEvent {
            id: self.id,
            event_key: self.event_key,
            school_id: self.school_id,
            student_id: self.student_id,
            device_id: self.device_id,
            event_type: self
                .event_type
                .parse::<EventType>()
                .unwrap_or(EventType::In),
            timestamp: DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or_default(),
            raw_payload: self.raw_payload,
        }
    }
}
