//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendance;
mod classes;
mod devices;
mod provisioning;
mod schools;
mod students;
mod users;

use crate::config::AppConfig;
use crate::errors::{AttendanceError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AttendanceError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AttendanceError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    attendance::entities::DailyAttendance,
    classes::{
        entities::Class,
        requests::{CreateClassRequest, UpdateClassRequest},
    },
    devices::{
        entities::Device,
        requests::{CreateDeviceRequest, UpdateDeviceRequest},
    },
    provisioning::entities::{DeviceLink, Provisioning, ProvisioningLog},
    schools::{entities::School, requests::UpdateSchoolRequest},
    students::{
        entities::Student,
        requests::{StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::{
    BulkUpsertOutcome, CreateSchoolData, DeviceResultData, ManualAttendanceData, OrphanEventData,
    ProvisionStartData, ProvisionStartOutcome, ProvisioningLogData, SchoolListQuery,
    ScopedListQuery, Storage, StudentUpsertData, TodayRowData, WebhookApplyData, WebhookOutcome,
};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<i64> {
        self.count_users_impl().await
    }

    // 学校模块
    async fn create_school(&self, data: CreateSchoolData) -> Result<School> {
        self.create_school_impl(data).await
    }

    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>> {
        self.get_school_by_id_impl(id).await
    }

    async fn get_school_by_name(&self, name: &str) -> Result<Option<School>> {
        self.get_school_by_name_impl(name).await
    }

    async fn list_schools_with_pagination(
        &self,
        query: SchoolListQuery,
    ) -> Result<(Vec<School>, i64)> {
        self.list_schools_with_pagination_impl(query).await
    }

    async fn update_school(
        &self,
        id: i64,
        update: UpdateSchoolRequest,
        new_secret: Option<String>,
    ) -> Result<Option<School>> {
        self.update_school_impl(id, update, new_secret).await
    }

    async fn delete_school(&self, id: i64) -> Result<bool> {
        self.delete_school_impl(id).await
    }

    // 班级模块
    async fn create_class(&self, school_id: i64, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(school_id, class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_name(&self, school_id: i64, name: &str) -> Result<Option<Class>> {
        self.get_class_by_name_impl(school_id, name).await
    }

    async fn list_classes_with_pagination(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Class>, i64)> {
        self.list_classes_with_pagination_impl(school_id, query)
            .await
    }

    async fn list_school_classes(&self, school_id: i64) -> Result<Vec<Class>> {
        self.list_school_classes_impl(school_id).await
    }

    async fn filter_class_ids_in_school(
        &self,
        school_id: i64,
        class_ids: &[i64],
    ) -> Result<Vec<i64>> {
        self.filter_class_ids_in_school_impl(school_id, class_ids)
            .await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 学生模块
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_device_id(
        &self,
        school_id: i64,
        device_student_id: &str,
    ) -> Result<Option<Student>> {
        self.get_student_by_device_id_impl(school_id, device_student_id)
            .await
    }

    async fn list_students_with_pagination(
        &self,
        school_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(school_id, query)
            .await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
        full_name: Option<String>,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update, full_name).await
    }

    async fn deactivate_student(&self, id: i64) -> Result<bool> {
        self.deactivate_student_impl(id).await
    }

    async fn find_duplicate_name_in_class(
        &self,
        school_id: i64,
        class_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Student>> {
        self.find_duplicate_name_in_class_impl(school_id, class_id, first_name, last_name)
            .await
    }

    async fn find_students_by_device_ids(
        &self,
        school_id: i64,
        device_student_ids: &[String],
    ) -> Result<Vec<Student>> {
        self.find_students_by_device_ids_impl(school_id, device_student_ids)
            .await
    }

    async fn bulk_upsert_students(
        &self,
        school_id: i64,
        rows: Vec<StudentUpsertData>,
    ) -> Result<BulkUpsertOutcome> {
        self.bulk_upsert_students_impl(school_id, rows).await
    }

    // 设备模块
    async fn create_device(&self, school_id: i64, device: CreateDeviceRequest) -> Result<Device> {
        self.create_device_impl(school_id, device).await
    }

    async fn get_device_by_id(&self, id: i64) -> Result<Option<Device>> {
        self.get_device_by_id_impl(id).await
    }

    async fn get_device_by_sn(&self, device_sn: &str) -> Result<Option<Device>> {
        self.get_device_by_sn_impl(device_sn).await
    }

    async fn find_devices_by_name(&self, school_id: i64, name: &str) -> Result<Vec<Device>> {
        self.find_devices_by_name_impl(school_id, name).await
    }

    async fn list_devices_with_pagination(
        &self,
        school_id: i64,
        query: ScopedListQuery,
    ) -> Result<(Vec<Device>, i64)> {
        self.list_devices_with_pagination_impl(school_id, query)
            .await
    }

    async fn list_active_devices(&self, school_id: i64) -> Result<Vec<Device>> {
        self.list_active_devices_impl(school_id).await
    }

    async fn filter_device_ids_in_school(
        &self,
        school_id: i64,
        device_ids: &[i64],
    ) -> Result<Vec<i64>> {
        self.filter_device_ids_in_school_impl(school_id, device_ids)
            .await
    }

    async fn update_device(&self, id: i64, update: UpdateDeviceRequest) -> Result<Option<Device>> {
        self.update_device_impl(id, update).await
    }

    async fn delete_device(&self, id: i64) -> Result<bool> {
        self.delete_device_impl(id).await
    }

    async fn touch_device_last_seen(
        &self,
        id: i64,
        seen_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        self.touch_device_last_seen_impl(id, seen_at).await
    }

    async fn get_last_event_time_for_device(
        &self,
        device_id: i64,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
        self.get_last_event_time_for_device_impl(device_id).await
    }

    // 考勤模块
    async fn apply_webhook_event(&self, data: WebhookApplyData) -> Result<WebhookOutcome> {
        self.apply_webhook_event_impl(data).await
    }

    async fn record_orphan_event(&self, data: OrphanEventData) -> Result<bool> {
        self.record_orphan_event_impl(data).await
    }

    async fn list_today_attendance(
        &self,
        school_id: i64,
        date: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<TodayRowData>> {
        self.list_today_attendance_impl(school_id, date, class_id)
            .await
    }

    async fn list_attendance_range(
        &self,
        school_id: i64,
        from: &str,
        to: &str,
        class_id: Option<i64>,
    ) -> Result<Vec<DailyAttendance>> {
        self.list_attendance_range_impl(school_id, from, to, class_id)
            .await
    }

    async fn upsert_manual_attendance(
        &self,
        data: ManualAttendanceData,
    ) -> Result<DailyAttendance> {
        self.upsert_manual_attendance_impl(data).await
    }

    // 下发模块
    async fn start_provisioning(&self, data: ProvisionStartData) -> Result<ProvisionStartOutcome> {
        self.start_provisioning_impl(data).await
    }

    async fn find_provisioning_by_request_id(
        &self,
        school_id: i64,
        request_id: &str,
    ) -> Result<Option<Provisioning>> {
        self.find_provisioning_by_request_id_impl(school_id, request_id)
            .await
    }

    async fn get_provisioning_by_id(&self, id: i64) -> Result<Option<Provisioning>> {
        self.get_provisioning_by_id_impl(id).await
    }

    async fn get_provisioning_links(&self, provisioning_id: i64) -> Result<Vec<DeviceLink>> {
        self.get_provisioning_links_impl(provisioning_id).await
    }

    async fn apply_device_result(
        &self,
        data: DeviceResultData,
    ) -> Result<(Provisioning, DeviceLink)> {
        self.apply_device_result_impl(data).await
    }

    async fn retry_provisioning_links(
        &self,
        provisioning_id: i64,
        device_ids: Option<Vec<i64>>,
    ) -> Result<(Provisioning, i64)> {
        self.retry_provisioning_links_impl(provisioning_id, device_ids)
            .await
    }

    async fn finalize_provisioning_failure(
        &self,
        provisioning_id: i64,
        reason: &str,
    ) -> Result<Provisioning> {
        self.finalize_provisioning_failure_impl(provisioning_id, reason)
            .await
    }

    async fn insert_provisioning_log(&self, data: ProvisioningLogData) -> Result<()> {
        self.insert_provisioning_log_impl(data).await
    }

    async fn list_provisioning_logs(
        &self,
        provisioning_id: i64,
        limit: u64,
    ) -> Result<Vec<ProvisioningLog>> {
        self.list_provisioning_logs_impl(provisioning_id, limit)
            .await
    }
}
