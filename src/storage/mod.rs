use std::sync::Arc;

use crate::models::{
    attendance::entities::{AttendanceStatus, DailyAttendance, EventType},
    classes::{
        entities::Class,
        requests::{CreateClassRequest, UpdateClassRequest},
    },
    devices::{
        entities::Device,
        requests::{CreateDeviceRequest, UpdateDeviceRequest},
    },
    imports::responses::ImportedStudentRef,
    provisioning::entities::{DeviceLink, LinkStatus, Provisioning, ProvisioningLog},
    schools::{entities::School, requests::UpdateSchoolRequest},
    students::{
        entities::{Gender, Student},
        requests::{StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 创建学校的数据（webhook secret 由服务层生成）
#[derive(Debug, Clone)]
pub struct CreateSchoolData {
    pub name: String,
    pub timezone: String,
    pub late_threshold_minutes: i64,
    pub absence_cutoff_minutes: i64,
    pub webhook_secret: String,
}

/// 学校列表查询
#[derive(Debug, Clone, Default)]
pub struct SchoolListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// 班级/设备通用列表查询
#[derive(Debug, Clone, Default)]
pub struct ScopedListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// 归一化后的学生写入数据（provisioning / 导入共用）
#[derive(Debug, Clone)]
pub struct StudentUpsertData {
    pub class_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub full_name: String,
    pub gender: Gender,
    pub parent_phone: Option<String>,
    pub device_student_id: String,
}

/// 下发开通事务的输入
#[derive(Debug, Clone)]
pub struct ProvisionStartData {
    pub school_id: i64,
    pub student: StudentUpsertData,
    pub device_ids: Vec<i64>,
    pub request_id: Option<String>,
}

/// 下发开通事务的结果
#[derive(Debug)]
pub struct ProvisionStartOutcome {
    pub student: Student,
    pub provisioning: Provisioning,
    pub link_count: i64,
}

/// 批量导入 upsert 的结果
#[derive(Debug)]
pub struct BulkUpsertOutcome {
    pub created: Vec<ImportedStudentRef>,
    pub updated: Vec<ImportedStudentRef>,
    /// 变更前后快照（审计用，服务层截断）
    pub before_after: Vec<serde_json::Value>,
}

/// webhook 事件落库的输入（时区换算在服务层完成）
#[derive(Debug, Clone)]
pub struct WebhookApplyData {
    pub school_id: i64,
    pub student_id: i64,
    pub device_id: Option<i64>,
    pub event_key: String,
    pub event_type: EventType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub raw_payload: Option<String>,
    /// "YYYY-MM-DD"，学校时区
    pub date: String,
    /// 事件时刻在学校时区的分钟数（0-1439）
    pub event_minutes: i64,
    pub class_start: Option<String>,
    pub late_threshold_minutes: i64,
    pub absence_cutoff_minutes: i64,
    pub min_scan_interval_seconds: i64,
    pub max_session_minutes: i64,
}

/// webhook 事件落库的结果
#[derive(Debug)]
pub enum WebhookOutcome {
    /// event_key 已存在
    DuplicateEvent,
    /// 最小扫描间隔内的重复刷卡
    DuplicateScan,
    Applied {
        status: AttendanceStatus,
        late_minutes: i64,
        currently_in_school: bool,
    },
}

/// 仅保留原始事件（未匹配到学生）
#[derive(Debug, Clone)]
pub struct OrphanEventData {
    pub school_id: i64,
    pub device_id: Option<i64>,
    pub event_key: String,
    pub event_type: EventType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub raw_payload: Option<String>,
}

/// 今日名单的一行（左连接 daily_attendance）
#[derive(Debug)]
pub struct TodayRowData {
    pub student: Student,
    pub class: Class,
    pub daily: Option<DailyAttendance>,
}

/// 手工修正考勤的数据
#[derive(Debug, Clone)]
pub struct ManualAttendanceData {
    pub school_id: i64,
    pub student_id: i64,
    pub date: String,
    pub status: AttendanceStatus,
    pub late_minutes: i64,
}

/// 下发审计日志写入
#[derive(Debug, Clone)]
pub struct ProvisioningLogData {
    pub school_id: i64,
    pub student_id: Option<i64>,
    pub provisioning_id: Option<i64>,
    pub device_id: Option<i64>,
    pub level: String,
    pub stage: String,
    pub status: String,
    pub message: String,
    pub payload: Option<serde_json::Value>,
}

/// 单台设备下发结果的写入
#[derive(Debug, Clone)]
pub struct DeviceResultData {
    pub provisioning_id: i64,
    pub device_id: i64,
    pub status: LinkStatus,
    pub error: Option<String>,
    pub employee_no_on_device: Option<String>,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段已是哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 用户总数（启动时判断是否需要种子管理员）
    async fn count_users(&self) -> Result<i64>;

    /// 学校管理方法
    async fn create_school(&self, data: CreateSchoolData) -> Result<School>;
    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>>;
    async fn get_school_by_name(&self, name: &str) -> Result<Option<School>>;
    async fn list_schools_with_pagination(&self, query: SchoolListQuery)
    -> Result<(Vec<School>, i64)>;
    async fn update_school(&self, id: i64, update: UpdateSchoolRequest, new_secret: Option<String>)
    -> Result<Option<School>>;
    async fn delete_school(&self, id: i64) -> Result<bool>;

    /// 班级管理方法
    async fn create_class(&self, school_id: i64, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_by_name(&self, school_id: i64, name: &str) -> Result<Option<Class>>;
    async fn list_classes_with_pagination(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Class>, i64)>;
    async fn list_school_classes(&self, school_id: i64) -> Result<Vec<Class>>;
    // 校验导入行引用的班级，返回确属该学校的 id 集合
    async fn filter_class_ids_in_school(
        &self,
        school_id: i64,
        class_ids: &[i64],
    ) -> Result<Vec<i64>>;
    async fn update_class(&self, class_id: i64, update: UpdateClassRequest)
    -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 学生管理方法
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_device_id(
        &self,
        school_id: i64,
        device_student_id: &str,
    ) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        school_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
        full_name: Option<String>,
    ) -> Result<Option<Student>>;
    // 软删除：置 is_active = false
    async fn deactivate_student(&self, id: i64) -> Result<bool>;
    // 同班同名学生查找（重名保护）
    async fn find_duplicate_name_in_class(
        &self,
        school_id: i64,
        class_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Student>>;
    // 导入批次内已存在的学生（按工号）
    async fn find_students_by_device_ids(
        &self,
        school_id: i64,
        device_student_ids: &[String],
    ) -> Result<Vec<Student>>;
    // 单事务批量 upsert（设备导入提交）
    async fn bulk_upsert_students(
        &self,
        school_id: i64,
        rows: Vec<StudentUpsertData>,
    ) -> Result<BulkUpsertOutcome>;

    /// 设备管理方法
    async fn create_device(&self, school_id: i64, device: CreateDeviceRequest) -> Result<Device>;
    async fn get_device_by_id(&self, id: i64) -> Result<Option<Device>>;
    async fn get_device_by_sn(&self, device_sn: &str) -> Result<Option<Device>>;
    async fn find_devices_by_name(&self, school_id: i64, name: &str) -> Result<Vec<Device>>;
    async fn list_devices_with_pagination(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Device>, i64)>;
    async fn list_active_devices(&self, school_id: i64) -> Result<Vec<Device>>;
    async fn filter_device_ids_in_school(
        &self,
        school_id: i64,
        device_ids: &[i64],
    ) -> Result<Vec<i64>>;
    async fn update_device(&self, id: i64, update: UpdateDeviceRequest) -> Result<Option<Device>>;
    async fn delete_device(&self, id: i64) -> Result<bool>;
    async fn touch_device_last_seen(&self, id: i64, seen_at: chrono::DateTime<chrono::Utc>)
    -> Result<()>;
    async fn get_last_event_time_for_device(
        &self,
        device_id: i64,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>>;

    /// 考勤方法
    // webhook 事件事务：幂等插入 + 重复刷卡抑制 + 日汇总 upsert
    async fn apply_webhook_event(&self, data: WebhookApplyData) -> Result<WebhookOutcome>;
    // 未匹配学生的事件仅存原始记录
    async fn record_orphan_event(&self, data: OrphanEventData) -> Result<bool>;
    // 今日名单（学生 × 班级 × 可选日汇总）
    async fn list_today_attendance(
        &self,
        school_id: i64,
        date: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<TodayRowData>>;
    // 日期区间内的日汇总记录
    async fn list_attendance_range(
        &self,
        school_id: i64,
        from: &str,
        to: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<DailyAttendance>>;
    // 手工修正 (student_id, date) 记录
    async fn upsert_manual_attendance(&self, data: ManualAttendanceData)
    -> Result<DailyAttendance>;

    /// 下发管理方法
    // 开通事务：学生 upsert + 流程行 + 设备链路 + 状态镜像
    async fn start_provisioning(&self, data: ProvisionStartData) -> Result<ProvisionStartOutcome>;
    // request_id 幂等重放查找
    async fn find_provisioning_by_request_id(
        &self,
        school_id: i64,
        request_id: &str,
    ) -> Result<Option<Provisioning>>;
    async fn get_provisioning_by_id(&self, id: i64) -> Result<Option<Provisioning>>;
    async fn get_provisioning_links(&self, provisioning_id: i64) -> Result<Vec<DeviceLink>>;
    // 单台设备结果：链路 upsert + 聚合状态重算 + 学生镜像
    async fn apply_device_result(&self, data: DeviceResultData)
    -> Result<(Provisioning, DeviceLink)>;
    // 重试：把指定（或全部 failed）链路重置为 pending
    async fn retry_provisioning_links(
        &self,
        provisioning_id: i64,
        device_ids: Option<Vec<i64>>,
    ) -> Result<(Provisioning, i64)>;
    // 收尾：把仍 pending 的链路判失败并重算
    async fn finalize_provisioning_failure(
        &self,
        provisioning_id: i64,
        reason: &str,
    ) -> Result<Provisioning>;
    async fn insert_provisioning_log(&self, data: ProvisioningLogData) -> Result<()>;
    async fn list_provisioning_logs(
        &self,
        provisioning_id: i64,
        limit: u64,
    ) -> Result<Vec<ProvisioningLog>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
