use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建学校表
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schools::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schools::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Schools::Timezone).string().not_null())
                    .col(
                        ColumnDef::new(Schools::LateThresholdMinutes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schools::AbsenceCutoffMinutes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Schools::WebhookSecret).string().not_null())
                    .col(
                        ColumnDef::new(Schools::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Schools::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Schools::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::SchoolId).big_integer().null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建班级表
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classes::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::GradeLevel).string().null())
                    .col(ColumnDef::new(Classes::StartTime).string().not_null())
                    .col(ColumnDef::new(Classes::EndTime).string().null())
                    .col(ColumnDef::new(Classes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Classes::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Classes::Table, Classes::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Students::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(Students::FirstName).string().not_null())
                    .col(ColumnDef::new(Students::LastName).string().not_null())
                    .col(ColumnDef::new(Students::FatherName).string().null())
                    .col(ColumnDef::new(Students::FullName).string().not_null())
                    .col(ColumnDef::new(Students::Gender).string().not_null())
                    .col(ColumnDef::new(Students::ParentPhone).string().null())
                    .col(
                        ColumnDef::new(Students::DeviceStudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Students::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Students::DeviceSyncStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Students::DeviceSyncUpdatedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Students::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Students::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建设备表
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devices::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Devices::DeviceSn)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Devices::Name).string().not_null())
                    .col(ColumnDef::new(Devices::Location).string().null())
                    .col(
                        ColumnDef::new(Devices::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Devices::LastSeen).big_integer().null())
                    .col(ColumnDef::new(Devices::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Devices::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Devices::Table, Devices::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建原始考勤事件表
        manager
            .create_table(
                Table::create()
                    .table(AttendanceEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::EventKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::StudentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::DeviceId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::EventType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceEvents::RawPayload).text().null())
                    .col(
                        ColumnDef::new(AttendanceEvents::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceEvents::Table, AttendanceEvents::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建按天汇总考勤表
        manager
            .create_table(
                Table::create()
                    .table(DailyAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyAttendance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyAttendance::Date).string().not_null())
                    .col(ColumnDef::new(DailyAttendance::Status).string().not_null())
                    .col(
                        ColumnDef::new(DailyAttendance::LateMinutes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::FirstScanTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::LastScanTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::LastInTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::LastOutTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::CurrentlyInSchool)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::ScanCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::TotalTimeOnPremises)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyAttendance::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DailyAttendance::Table, DailyAttendance::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建下发流程表
        manager
            .create_table(
                Table::create()
                    .table(StudentProvisionings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentProvisionings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::RequestId)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::LastError)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProvisionings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentProvisionings::Table, StudentProvisionings::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学生-设备链路表
        manager
            .create_table(
                Table::create()
                    .table(StudentDeviceLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentDeviceLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::ProvisioningId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::DeviceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentDeviceLinks::LastError).text().null())
                    .col(
                        ColumnDef::new(StudentDeviceLinks::EmployeeNoOnDevice)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::AttemptCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::LastAttemptAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentDeviceLinks::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentDeviceLinks::Table, StudentDeviceLinks::ProvisioningId)
                            .to(StudentProvisionings::Table, StudentProvisionings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentDeviceLinks::Table, StudentDeviceLinks::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建下发审计日志表
        manager
            .create_table(
                Table::create()
                    .table(ProvisioningLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProvisioningLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProvisioningLogs::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProvisioningLogs::StudentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProvisioningLogs::ProvisioningId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProvisioningLogs::DeviceId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ProvisioningLogs::Level).string().not_null())
                    .col(ColumnDef::new(ProvisioningLogs::Stage).string().not_null())
                    .col(ColumnDef::new(ProvisioningLogs::Status).string().not_null())
                    .col(
                        ColumnDef::new(ProvisioningLogs::Message)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProvisioningLogs::Payload).text().null())
                    .col(
                        ColumnDef::new(ProvisioningLogs::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProvisioningLogs::Table, ProvisioningLogs::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：同一学校内设备工号唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_students_school_device_student_id")
                    .table(Students::Table)
                    .col(Students::SchoolId)
                    .col(Students::DeviceStudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 唯一索引：每个学生每天一条记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_daily_attendance_student_date")
                    .table(DailyAttendance::Table)
                    .col(DailyAttendance::StudentId)
                    .col(DailyAttendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 唯一索引：每个下发流程对每台设备只有一条链路
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_device_links_provisioning_device")
                    .table(StudentDeviceLinks::Table)
                    .col(StudentDeviceLinks::ProvisioningId)
                    .col(StudentDeviceLinks::DeviceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 唯一索引：班级名在学校内唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_classes_school_name")
                    .table(Classes::Table)
                    .col(Classes::SchoolId)
                    .col(Classes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_events_school_timestamp")
                    .table(AttendanceEvents::Table)
                    .col(AttendanceEvents::SchoolId)
                    .col(AttendanceEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_attendance_school_date")
                    .table(DailyAttendance::Table)
                    .col(DailyAttendance::SchoolId)
                    .col(DailyAttendance::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_provisioning_logs_school_created")
                    .table(ProvisioningLogs::Table)
                    .col(ProvisioningLogs::SchoolId)
                    .col(ProvisioningLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_provisionings_school_request")
                    .table(StudentProvisionings::Table)
                    .col(StudentProvisionings::SchoolId)
                    .col(StudentProvisionings::RequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按外键依赖倒序删除
        manager
            .drop_table(Table::drop().table(ProvisioningLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentDeviceLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentProvisionings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyAttendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
    Name,
    Timezone,
    LateThresholdMinutes,
    AbsenceCutoffMinutes,
    WebhookSecret,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    SchoolId,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
    SchoolId,
    Name,
    GradeLevel,
    StartTime,
    EndTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    SchoolId,
    ClassId,
    FirstName,
    LastName,
    FatherName,
    FullName,
    Gender,
    ParentPhone,
    DeviceStudentId,
    IsActive,
    DeviceSyncStatus,
    DeviceSyncUpdatedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Devices {
    #[sea_orm(iden = "devices")]
    Table,
    Id,
    SchoolId,
    DeviceSn,
    Name,
    Location,
    IsActive,
    LastSeen,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceEvents {
    #[sea_orm(iden = "attendance_events")]
    Table,
    Id,
    EventKey,
    SchoolId,
    StudentId,
    DeviceId,
    EventType,
    Timestamp,
    RawPayload,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DailyAttendance {
    #[sea_orm(iden = "daily_attendance")]
    Table,
    Id,
    SchoolId,
    StudentId,
    Date,
    Status,
    LateMinutes,
    FirstScanTime,
    LastScanTime,
    LastInTime,
    LastOutTime,
    CurrentlyInSchool,
    ScanCount,
    TotalTimeOnPremises,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentProvisionings {
    #[sea_orm(iden = "student_provisionings")]
    Table,
    Id,
    SchoolId,
    StudentId,
    Status,
    RequestId,
    LastError,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentDeviceLinks {
    #[sea_orm(iden = "student_device_links")]
    Table,
    Id,
    ProvisioningId,
    StudentId,
    DeviceId,
    Status,
    LastError,
    EmployeeNoOnDevice,
    AttemptCount,
    LastAttemptAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProvisioningLogs {
    #[sea_orm(iden = "provisioning_logs")]
    Table,
    Id,
    SchoolId,
    StudentId,
    ProvisioningId,
    DeviceId,
    Level,
    Stage,
    Status,
    Message,
    Payload,
    CreatedAt,
}
