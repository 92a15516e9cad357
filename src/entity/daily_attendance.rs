//! 按天汇总考勤实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    /// "YYYY-MM-DD"，学校时区；(student_id, date) 唯一
    pub date: String,
    pub status: String,
    pub late_minutes: i64,
    pub first_scan_time: Option<i64>,
    pub last_scan_time: Option<i64>,
    pub last_in_time: Option<i64>,
    pub last_out_time: Option<i64>,
    pub currently_in_school: bool,
    pub scan_count: i64,
    pub total_time_on_premises: i64,
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
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    School,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_daily(self) -> crate::models::attendance::entities::DailyAttendance {
        use crate::models::attendance::entities::{AttendanceStatus, DailyAttendance};
        use chrono::{DateTime, Utc};

        let ts = |v: Option<i64>| v.map(|t| DateTime::<Utc>::from_timestamp(t, 0).unwrap_or_default());

        DailyAttendance {
            id: self.id,
            school_id: self.school_id,
            student_id: self.student_id,
            date: self.date,
            status: self
                .status
                .parse::<AttendanceStatus>()
                .unwrap_or(AttendanceStatus::Absent),
            late_minutes: self.late_minutes,
            first_scan_time: ts(self.first_scan_time),
            last_scan_time: ts(self.last_scan_time),
            last_in_time: ts(self.last_in_time),
            last_out_time: ts(self.last_out_time),
            currently_in_school: self.currently_in_school,
            scan_count: self.scan_count,
            total_time_on_premises: self.total_time_on_premises,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
